use axum::response::Html;

const DASHBOARD: &str = include_str!("../../assets/dashboard.html");

pub async fn dashboard_handler() -> Html<&'static str> {
    Html(DASHBOARD)
}
