//! Integration tests for the analytics endpoints.
//!
//! These tests run against a real PostgreSQL database (TEST_DATABASE_URL)
//! and exercise the full stack: auth middleware, query parameter coercion,
//! aggregate queries, and the response envelopes.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use tower::ServiceExt;

use common::{
    auth_token, cleanup_all_test_data, create_test_app, create_test_pool, db_lock, get_request,
    get_request_with_auth, parse_response_body, run_migrations, seed_customer, seed_deal,
    seed_lead, seed_user, SeedCustomer, SeedDeal, SeedLead,
};

const ANALYTICS_ENDPOINTS: [&str; 6] = [
    "/api/analytics/overview",
    "/api/analytics/trends",
    "/api/analytics/lead-performance",
    "/api/analytics/deal-pipeline",
    "/api/analytics/customer-insights",
    "/api/analytics/team-performance",
];

#[tokio::test]
async fn test_analytics_endpoints_require_auth() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool);

    for endpoint in ANALYTICS_ENDPOINTS {
        let response = app.clone().oneshot(get_request(endpoint)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{} should require auth",
            endpoint
        );

        let body = parse_response_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"]["message"].is_string());
    }
}

#[tokio::test]
async fn test_analytics_rejects_garbage_token() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool);

    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/overview",
            "not-a-real-token",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_overview_customer_counts() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    for _ in 0..3 {
        seed_customer(&pool, &SeedCustomer::default()).await;
    }
    seed_customer(
        &pool,
        &SeedCustomer {
            status: "inactive".to_string(),
            ..Default::default()
        },
    )
    .await;

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/overview",
            &auth_token(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["success"], true);

    let customers = &body["data"]["customers"];
    assert_eq!(customers["total"], 4);
    assert_eq!(customers["active"], 3);
    assert_eq!(customers["inactive"], 1);
    assert_eq!(
        customers["total"].as_i64().unwrap(),
        customers["active"].as_i64().unwrap() + customers["inactive"].as_i64().unwrap()
    );
}

#[tokio::test]
async fn test_overview_derived_metrics() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    // 4 leads; deals: 2 won (30000 + 10000), 1 lost, 1 open
    for _ in 0..4 {
        seed_lead(&pool, &SeedLead::default()).await;
    }
    for value in [30000.0, 10000.0] {
        seed_deal(
            &pool,
            &SeedDeal {
                value,
                stage: "closed-won".to_string(),
                actual_close_date: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await;
    }
    seed_deal(
        &pool,
        &SeedDeal {
            stage: "closed-lost".to_string(),
            ..Default::default()
        },
    )
    .await;
    seed_deal(&pool, &SeedDeal::default()).await;

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/overview",
            &auth_token(),
        ))
        .await
        .unwrap();

    let body = parse_response_body(response).await;
    let data = &body["data"];

    assert_eq!(data["deals"]["total"], 4);
    assert_eq!(data["deals"]["won"], 2);
    assert_eq!(data["deals"]["lost"], 1);
    assert_eq!(data["revenue"]["totalRevenue"], 40000.0);

    let metrics = &data["metrics"];
    // winRate is a number, not a formatted string
    assert!(metrics["winRate"].is_number());
    assert_eq!(metrics["winRate"], 50.0);
    assert_eq!(metrics["conversionRate"], 50.0);
    assert_eq!(metrics["avgDealSize"], 20000.0);
}

#[tokio::test]
async fn test_overview_empty_data_returns_zeros() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/overview",
            &auth_token(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["success"], true);

    let data = &body["data"];
    for group in ["customers", "leads", "deals", "revenue", "metrics"] {
        assert!(data[group].is_object(), "missing group {}", group);
    }
    assert_eq!(data["customers"]["total"], 0);
    assert_eq!(data["metrics"]["conversionRate"], 0.0);
    assert_eq!(data["metrics"]["winRate"], 0.0);
    assert_eq!(data["metrics"]["avgDealSize"], 0.0);
}

#[tokio::test]
async fn test_overview_malformed_dates_are_ignored() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    seed_customer(&pool, &SeedCustomer::default()).await;

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/overview?startDate=banana&endDate=31/12/2026",
            &auth_token(),
        ))
        .await
        .unwrap();

    // Malformed dates coerce to an open window, never 400
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["data"]["customers"]["total"], 1);
}

#[tokio::test]
async fn test_overview_date_window_filters_counts_not_revenue() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let old = Utc::now() - Duration::days(400);
    seed_customer(
        &pool,
        &SeedCustomer {
            created_at: old,
            ..Default::default()
        },
    )
    .await;
    seed_customer(&pool, &SeedCustomer::default()).await;

    // Old won deal: outside the window but still in totalRevenue
    seed_deal(
        &pool,
        &SeedDeal {
            value: 30000.0,
            stage: "closed-won".to_string(),
            actual_close_date: Some(old),
            created_at: old,
            ..Default::default()
        },
    )
    .await;

    let start = (Utc::now() - Duration::days(30)).format("%Y-%m-%d").to_string();
    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            &format!("/api/analytics/overview?startDate={}", start),
            &auth_token(),
        ))
        .await
        .unwrap();

    let body = parse_response_body(response).await;
    let data = &body["data"];
    assert_eq!(data["customers"]["total"], 1);
    assert_eq!(data["deals"]["total"], 0);
    assert_eq!(data["revenue"]["totalRevenue"], 30000.0);
}

#[tokio::test]
async fn test_trends_customer_counts_sum_to_window_total() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    // 5 customers spread over the last 3 months, 1 outside the window
    let now = Utc::now();
    for days_ago in [5, 10, 40, 45, 70] {
        seed_customer(
            &pool,
            &SeedCustomer {
                created_at: now - Duration::days(days_ago),
                ..Default::default()
            },
        )
        .await;
    }
    seed_customer(
        &pool,
        &SeedCustomer {
            created_at: now - Duration::days(400),
            ..Default::default()
        },
    )
    .await;

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/trends?months=6",
            &auth_token(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let data = &body["data"];
    assert_eq!(data["months"], 6);

    let total: i64 = data["customers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["count"].as_i64().unwrap())
        .sum();
    assert_eq!(total, 5);
}

#[tokio::test]
async fn test_trends_malformed_months_falls_back_to_default() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/trends?months=banana",
            &auth_token(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["data"]["months"], 12);
}

#[tokio::test]
async fn test_trends_deal_series_tracks_won_deals() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    seed_deal(
        &pool,
        &SeedDeal {
            value: 30000.0,
            stage: "closed-won".to_string(),
            actual_close_date: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await;
    // Open deal must not appear in the deals series
    seed_deal(&pool, &SeedDeal::default()).await;

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/trends",
            &auth_token(),
        ))
        .await
        .unwrap();

    let body = parse_response_body(response).await;
    let deals = body["data"]["deals"].as_array().unwrap().clone();
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0]["count"], 1);
    assert_eq!(deals[0]["revenue"], 30000.0);

    let revenue = body["data"]["revenue"].as_array().unwrap().clone();
    assert_eq!(revenue.len(), 1);
    assert_eq!(revenue[0]["revenue"], 30000.0);
}

#[tokio::test]
async fn test_lead_performance_by_source() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    for source in ["website", "website", "referral"] {
        seed_lead(
            &pool,
            &SeedLead {
                source: source.to_string(),
                ..Default::default()
            },
        )
        .await;
    }

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/lead-performance",
            &auth_token(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let by_source = body["data"]["bySource"].as_array().unwrap().clone();

    let website = by_source
        .iter()
        .find(|entry| entry["_id"] == "website")
        .expect("website source missing");
    assert_eq!(website["count"], 2);

    // Sorted by count descending
    assert_eq!(by_source[0]["_id"], "website");
}

#[tokio::test]
async fn test_lead_performance_score_distribution_zero_filled() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    // One lead at the top boundary: 100 belongs to the 80-100 bucket
    seed_lead(
        &pool,
        &SeedLead {
            score: 100,
            ..Default::default()
        },
    )
    .await;

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/lead-performance",
            &auth_token(),
        ))
        .await
        .unwrap();

    let body = parse_response_body(response).await;
    let distribution = body["data"]["scoreDistribution"].as_array().unwrap().clone();

    assert_eq!(distribution.len(), 6);
    let labels: Vec<&str> = distribution
        .iter()
        .map(|bucket| bucket["_id"].as_str().unwrap())
        .collect();
    assert_eq!(labels, ["0-19", "20-39", "40-59", "60-79", "80-100", "other"]);

    assert_eq!(distribution[4]["count"], 1);
    assert_eq!(distribution[0]["count"], 0);
    assert_eq!(distribution[5]["count"], 0);
}

#[tokio::test]
async fn test_lead_performance_avg_days_to_conversion() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let created = Utc::now() - Duration::days(10);
    seed_lead(
        &pool,
        &SeedLead {
            status: "closed-won".to_string(),
            conversion_date: Some(created + Duration::days(10)),
            created_at: created,
            ..Default::default()
        },
    )
    .await;
    // Unconverted lead does not affect the average
    seed_lead(&pool, &SeedLead::default()).await;

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/lead-performance",
            &auth_token(),
        ))
        .await
        .unwrap();

    let body = parse_response_body(response).await;
    assert_eq!(body["data"]["avgDaysToConversion"], 10.0);
}

#[tokio::test]
async fn test_deal_pipeline_by_stage_and_expected_revenue() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    seed_deal(
        &pool,
        &SeedDeal {
            value: 10000.0,
            probability: 20.0,
            ..Default::default()
        },
    )
    .await;
    seed_deal(
        &pool,
        &SeedDeal {
            value: 15000.0,
            probability: 40.0,
            ..Default::default()
        },
    )
    .await;
    seed_deal(
        &pool,
        &SeedDeal {
            value: 30000.0,
            stage: "closed-won".to_string(),
            probability: 100.0,
            actual_close_date: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await;

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/deal-pipeline",
            &auth_token(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let data = &body["data"];

    let prospecting = data["byStage"]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["_id"] == "prospecting")
        .expect("prospecting stage missing")
        .clone();
    assert_eq!(prospecting["count"], 2);
    assert_eq!(prospecting["totalValue"], 25000.0);
    assert_eq!(prospecting["avgProbability"], 30.0);

    // 10000 x 0.2 + 15000 x 0.4; the closed-won deal is excluded
    assert_eq!(data["expectedRevenue"], 8000.0);
}

#[tokio::test]
async fn test_deal_pipeline_top_open_deals() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let owner = seed_user(&pool, "Raj", "Sharma").await;
    let customer = seed_customer(&pool, &SeedCustomer::default()).await;

    for (title, value) in [("Small", 1000.0), ("Big", 90000.0), ("Mid", 40000.0)] {
        seed_deal(
            &pool,
            &SeedDeal {
                title: title.to_string(),
                value,
                stage: "negotiation".to_string(),
                probability: 60.0,
                customer_id: Some(customer),
                assigned_to: Some(owner),
                ..Default::default()
            },
        )
        .await;
    }
    // Closed deals never appear in the top list
    seed_deal(
        &pool,
        &SeedDeal {
            title: "Closed".to_string(),
            value: 500000.0,
            stage: "closed-won".to_string(),
            actual_close_date: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await;

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/deal-pipeline",
            &auth_token(),
        ))
        .await
        .unwrap();

    let body = parse_response_body(response).await;
    let top = body["data"]["topOpenDeals"].as_array().unwrap().clone();

    assert_eq!(top.len(), 3);
    assert_eq!(top[0]["title"], "Big");
    assert_eq!(top[1]["title"], "Mid");
    assert_eq!(top[2]["title"], "Small");
    assert_eq!(top[0]["assignedTo"]["name"], "Raj Sharma");
    assert!(top[0]["customer"]["_id"].is_string());
}

#[tokio::test]
async fn test_customer_insights_nps_and_segments() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    // NPS 10, 9 promoters; 7 passive; 3 detractor
    for (nps, churn, ltv) in [
        (Some(10), Some("Low"), 50000.0),
        (Some(9), Some("Low"), 30000.0),
        (Some(7), Some("Medium"), 0.0),
        (Some(3), Some("High"), 20000.0),
    ] {
        seed_customer(
            &pool,
            &SeedCustomer {
                nps_score: nps,
                churn_risk: churn.map(String::from),
                lifetime_value: ltv,
                plan_type: Some("fiber-100".to_string()),
                plan_price: Some(799.0),
                ..Default::default()
            },
        )
        .await;
    }

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/customer-insights",
            &auth_token(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let data = &body["data"];

    let nps = &data["nps"];
    assert_eq!(nps["promoters"], 2);
    assert_eq!(nps["passives"], 1);
    assert_eq!(nps["detractors"], 1);
    assert_eq!(nps["responses"], 4);
    // (2 - 1) / 4 x 100
    assert_eq!(nps["npsScore"], 25.0);

    let plans = data["byPlanType"].as_array().unwrap();
    assert_eq!(plans[0]["_id"], "fiber-100");
    assert_eq!(plans[0]["count"], 4);
    assert_eq!(plans[0]["avgPrice"], 799.0);

    // Lifetime value aggregates only customers with positive value
    let ltv = &data["lifetimeValue"];
    assert_eq!(ltv["total"], 100000.0);
    assert_eq!(ltv["max"], 50000.0);
    assert_eq!(ltv["min"], 20000.0);

    let churn = data["byChurnRisk"].as_array().unwrap();
    let low = churn.iter().find(|entry| entry["_id"] == "Low").unwrap();
    assert_eq!(low["count"], 2);
}

#[tokio::test]
async fn test_team_performance_rollups() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let raj = seed_user(&pool, "Raj", "Sharma").await;
    let solo = seed_user(&pool, "Anita", "").await;

    // Raj: 2 leads, 1 converted
    seed_lead(
        &pool,
        &SeedLead {
            assigned_to: Some(raj),
            status: "closed-won".to_string(),
            conversion_date: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await;
    seed_lead(
        &pool,
        &SeedLead {
            assigned_to: Some(raj),
            ..Default::default()
        },
    )
    .await;
    // Unassigned lead is omitted from the rollup
    seed_lead(&pool, &SeedLead::default()).await;

    // Anita: 2 deals, 1 won worth 30000
    seed_deal(
        &pool,
        &SeedDeal {
            assigned_to: Some(solo),
            value: 30000.0,
            stage: "closed-won".to_string(),
            actual_close_date: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await;
    seed_deal(
        &pool,
        &SeedDeal {
            assigned_to: Some(solo),
            value: 5000.0,
            ..Default::default()
        },
    )
    .await;

    let app = create_test_app(pool);
    let response = app
        .oneshot(get_request_with_auth(
            "/api/analytics/team-performance",
            &auth_token(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let data = &body["data"];

    let leads = data["leads"].as_array().unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["_id"], raj.to_string());
    assert_eq!(leads[0]["name"], "Raj Sharma");
    assert_eq!(leads[0]["totalLeads"], 2);
    assert_eq!(leads[0]["converted"], 1);
    assert_eq!(leads[0]["conversionRate"], 50.0);

    let deals = data["deals"].as_array().unwrap();
    assert_eq!(deals.len(), 1);
    // Empty last name never produces a trailing space
    assert_eq!(deals[0]["name"], "Anita");
    assert_eq!(deals[0]["totalDeals"], 2);
    assert_eq!(deals[0]["won"], 1);
    assert_eq!(deals[0]["revenue"], 30000.0);
    assert_eq!(deals[0]["winRate"], 50.0);
}

#[tokio::test]
async fn test_health_endpoints_are_public() {
    let _guard = db_lock().await;
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool);

    for endpoint in ["/api/health", "/api/health/ready", "/api/health/live"] {
        let response = app.clone().oneshot(get_request(endpoint)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{} failed", endpoint);
    }
}
