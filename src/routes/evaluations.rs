use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::evaluations::requests::{
    DossierQuery, EvaluationListQuery, ScoreEvaluationRequest, SubmitEvaluationRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::EvaluationService;

// 懒加载的全局 EvaluationService 实例
static EVALUATION_SERVICE: Lazy<EvaluationService> = Lazy::new(EvaluationService::new_lazy);

// 提交本人评估数据
pub async fn submit_evaluation(
    req: HttpRequest,
    path: web::Path<String>, // category
    body: web::Json<SubmitEvaluationRequest>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .submit_evaluation(&req, &path.into_inner(), body.into_inner())
        .await
}

// 列出可见范围内某类别的记录
pub async fn list_evaluations(
    req: HttpRequest,
    path: web::Path<String>, // category
    query: web::Query<EvaluationListQuery>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .list_evaluations(&req, &path.into_inner(), query.into_inner())
        .await
}

// 给某教师的自评打分
pub async fn score_evaluation(
    req: HttpRequest,
    path: web::Path<(String, i64)>, // (category, user_id)
    query: web::Query<DossierQuery>,
    body: web::Json<ScoreEvaluationRequest>,
) -> ActixResult<HttpResponse> {
    let (category, user_id) = path.into_inner();
    EVALUATION_SERVICE
        .score_evaluation(&req, &category, user_id, query.year, body.into_inner())
        .await
}

// 某教师的年度档案
pub async fn get_dossier(
    req: HttpRequest,
    path: web::Path<i64>, // user_id
    query: web::Query<DossierQuery>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .get_dossier(&req, path.into_inner(), query.into_inner())
        .await
}

// 配置路由
pub fn configure_evaluations_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/evaluations")
            .wrap(middlewares::RequireJWT)
            .route("/{category}", web::post().to(submit_evaluation))
            .route("/{category}", web::get().to(list_evaluations))
            .service(
                web::scope("/{category}/{user_id}")
                    .wrap(middlewares::RequireRole::new_any(UserRole::head_roles()))
                    .route("/score", web::put().to(score_evaluation)),
            ),
    );

    // 档案路由
    cfg.service(
        web::scope("/api/v1/users/{user_id}/evaluations")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(get_dossier)),
    );
}
