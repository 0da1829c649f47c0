use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::evaluations::requests::EvaluationListQuery;
use crate::models::users::entities::UserRole;
use crate::services::ReportService;

// 懒加载的全局 ReportService 实例
static REPORT_SERVICE: Lazy<ReportService> = Lazy::new(ReportService::new_lazy);

// 年度 KPI 报表
pub async fn get_kpi_report(
    req: HttpRequest,
    query: web::Query<EvaluationListQuery>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.get_kpi_report(&req, query.into_inner()).await
}

// 配置路由
pub fn configure_reports_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/reports")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::head_roles()))
                    .route("/kpis", web::get().to(get_kpi_report)),
            ),
    );
}
