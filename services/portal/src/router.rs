use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use sacm_core::health::{healthz, readyz};
use sacm_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    academic::{
        create_level, create_major, create_semester, get_current_semester, list_levels,
        list_majors, list_semesters, set_current_semester, update_major, update_semester,
    },
    activation::{get_status, submit_code, submit_email, submit_identity, submit_password},
    admin::{create_user, get_dashboard, import_users, list_users, reactivate_user, suspend_user},
    audit::list_audit_logs,
    course::{
        assign_instructor, create_course, get_course, list_courses, list_instructor_courses,
        list_student_courses, unassign_instructor, update_course,
    },
    lecture_file::{
        delete_file, download_file, restore_file, set_visibility, update_file, upload_file,
        view_file,
    },
    notification::{
        delete_notification, list_notifications, mark_all_read, mark_read, unread_count,
    },
    password_reset::{check_reset_token, confirm_reset, request_reset},
    profile::{change_password, get_me, list_activities, update_me},
    promotion::{promote, promote_next, promotion_stats},
    study_aid::{
        ask, chat_history, clear_chat_history, generate_questions, get_quota, get_usage,
        question_history, summarize,
    },
    token::{check_token, create_token, refresh_token, revoke_token},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Token
        .route("/auth/token", get(check_token))
        .route("/auth/token", post(create_token))
        .route("/auth/token", patch(refresh_token))
        .route("/auth/token", delete(revoke_token))
        // Activation
        .route("/auth/activation", get(get_status))
        .route("/auth/activation/identity", post(submit_identity))
        .route("/auth/activation/email", post(submit_email))
        .route("/auth/activation/code", post(submit_code))
        .route("/auth/activation/password", post(submit_password))
        // Password reset
        .route("/auth/password-reset", post(request_reset))
        .route("/auth/password-reset/{token}", get(check_reset_token))
        .route("/auth/password-reset/{token}", post(confirm_reset))
        // Profile
        .route("/users/@me", get(get_me))
        .route("/users/@me", patch(update_me))
        .route("/users/@me/password", put(change_password))
        .route("/users/@me/activities", get(list_activities))
        .route("/users/@me/study-aid/quota", get(get_quota))
        .route("/users/@me/study-aid/usage", get(get_usage))
        // Notifications
        .route("/users/@me/notifications", get(list_notifications))
        .route("/users/@me/notifications/unread-count", get(unread_count))
        .route("/users/@me/notifications/read", post(mark_all_read))
        .route("/users/@me/notifications/{id}/read", post(mark_read))
        .route("/users/@me/notifications/{id}", delete(delete_notification))
        // Admin: users
        .route("/admin/dashboard", get(get_dashboard))
        .route("/admin/users", get(list_users))
        .route("/admin/users", post(create_user))
        .route("/admin/users/import", post(import_users))
        .route("/admin/users/{id}/suspend", post(suspend_user))
        .route("/admin/users/{id}/reactivate", post(reactivate_user))
        // Academic structure
        .route("/majors", get(list_majors))
        .route("/levels", get(list_levels))
        .route("/semesters/current", get(get_current_semester))
        .route("/admin/majors", post(create_major))
        .route("/admin/majors/{id}", put(update_major))
        .route("/admin/levels", post(create_level))
        .route("/admin/semesters", get(list_semesters))
        .route("/admin/semesters", post(create_semester))
        .route("/admin/semesters/{id}", put(update_semester))
        .route("/admin/semesters/{id}/current", post(set_current_semester))
        // Courses
        .route("/admin/courses", get(list_courses))
        .route("/admin/courses", post(create_course))
        .route("/admin/courses/{id}", put(update_course))
        .route("/admin/courses/{id}/instructors", post(assign_instructor))
        .route(
            "/admin/courses/{id}/instructors/{instructor_id}",
            delete(unassign_instructor),
        )
        .route("/student/courses", get(list_student_courses))
        .route("/instructor/courses", get(list_instructor_courses))
        .route("/courses/{id}", get(get_course))
        // Lecture files
        .route("/courses/{id}/files", post(upload_file))
        .route("/files/{id}", patch(update_file))
        .route("/files/{id}", delete(delete_file))
        .route("/files/{id}/visibility", put(set_visibility))
        .route("/files/{id}/restore", post(restore_file))
        .route("/files/{id}/download", get(download_file))
        .route("/files/{id}/view", get(view_file))
        // Study aid
        .route("/files/{id}/summary", post(summarize))
        .route("/files/{id}/questions", post(generate_questions))
        .route("/files/{id}/questions", get(question_history))
        .route("/files/{id}/ask", post(ask))
        .route("/files/{id}/ask", get(chat_history))
        .route("/files/{id}/ask", delete(clear_chat_history))
        // Promotion
        .route("/admin/promotions", post(promote))
        .route("/admin/promotions/next", post(promote_next))
        .route("/admin/promotions/stats", get(promotion_stats))
        // Audit
        .route("/admin/audit-logs", get(list_audit_logs))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
