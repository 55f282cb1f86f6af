use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use sikms::api::router;
use sikms::models::{NewUserRequest, Role};
use sikms::state::AppState;
use sikms::store::EntityStore;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    admin_token: String,
}

async fn setup() -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState::new(pool);
    let admin = state
        .store
        .create_user(NewUserRequest {
            email: "admin@sekolah.id".to_string(),
            full_name: "Admin Sekolah".to_string(),
            role: Role::Admin,
        })
        .await
        .expect("Failed to create admin");
    let admin_token = state
        .store
        .issue_session(&admin.id)
        .await
        .expect("Failed to issue session");

    TestApp {
        app: router(state),
        admin_token,
    }
}

impl TestApp {
    async fn raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, text) = self.raw(method, uri, Some(token), body).await;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap()
        };
        (status, value)
    }

    async fn user_with_token(&self, email: &str, name: &str, role: &str) -> (String, String) {
        let (status, user) = self
            .call(
                Method::POST,
                "/users",
                &self.admin_token,
                Some(json!({ "email": email, "full_name": name, "role": role })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = user["id"].as_str().unwrap().to_string();

        let (status, session) = self
            .call(Method::POST, &format!("/users/{}/sessions", id), &self.admin_token, None)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        (id, session["token"].as_str().unwrap().to_string())
    }

    async fn class_for(&self, name: &str, teacher_id: &str) -> String {
        let (status, class) = self
            .call(
                Method::POST,
                "/classes",
                &self.admin_token,
                Some(json!({ "name": name, "grade_level": "X", "teacher_id": teacher_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        class["id"].as_str().unwrap().to_string()
    }

    async fn student_in(&self, nis: &str, name: &str, class_id: &str, user_id: &str) -> Value {
        let (status, student) = self
            .call(
                Method::POST,
                "/students",
                &self.admin_token,
                Some(json!({
                    "nis": nis,
                    "name": name,
                    "class_id": class_id,
                    "parent_phone": "08123456789",
                    "user_id": user_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", student);
        student
    }
}

struct School {
    teacher_token: String,
    other_teacher_token: String,
    student_token: String,
}

async fn school(t: &TestApp) -> School {
    let (teacher_id, teacher_token) = t
        .user_with_token("sari@sekolah.id", "Bu Sari", "teacher")
        .await;
    let (other_teacher_id, other_teacher_token) = t
        .user_with_token("andi@sekolah.id", "Pak Andi", "teacher")
        .await;
    let (student_user_id, student_token) = t
        .user_with_token("budi@sekolah.id", "Budi Santoso", "student")
        .await;

    let class_id = t.class_for("X IPA 1", &teacher_id).await;
    t.class_for("X IPA 2", &other_teacher_id).await;
    t.student_in("1001", "Budi Santoso", &class_id, &student_user_id)
        .await;

    School {
        teacher_token,
        other_teacher_token,
        student_token,
    }
}

async fn submit(t: &TestApp, token: &str, date: &str, reason: &str) -> (StatusCode, Value) {
    t.call(
        Method::POST,
        "/permissions",
        token,
        Some(json!({ "permission_date": date, "reason": reason, "description": "Demam" })),
    )
    .await
}

#[tokio::test]
async fn test_requests_without_session_are_unauthorized() {
    let t = setup().await;
    let (status, body) = t.raw(Method::GET, "/dashboard", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["message"], "Gagal memuat data pengguna");
}

#[tokio::test]
async fn test_health() {
    let t = setup().await;
    let (status, _) = t.raw(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_submit_copies_student_fields() {
    let t = setup().await;
    let s = school(&t).await;

    let (status, permission) = submit(&t, &s.student_token, "2026-03-02", "sick").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(permission["status"], "pending");
    assert_eq!(permission["student_nis"], "1001");
    assert_eq!(permission["student_name"], "Budi Santoso");
    assert_eq!(permission["class_name"], "X IPA 1");
}

#[tokio::test]
async fn test_submit_requires_fields() {
    let t = setup().await;
    let s = school(&t).await;

    let (status, body) = submit(&t, &s.student_token, "2026-03-02", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Mohon lengkapi semua field yang wajib diisi");
}

#[tokio::test]
async fn test_student_without_record_cannot_submit() {
    let t = setup().await;
    let (_, token) = t
        .user_with_token("lost@sekolah.id", "Tanpa Data", "student")
        .await;

    let (status, body) = submit(&t, &token, "2026-03-02", "sick").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Data siswa tidak ditemukan");
}

#[tokio::test]
async fn test_reject_then_approve_is_refused() {
    let t = setup().await;
    let s = school(&t).await;
    let (_, permission) = submit(&t, &s.student_token, "2026-03-02", "family_emergency").await;
    let id = permission["id"].as_str().unwrap();

    let (status, body) = t
        .call(
            Method::POST,
            &format!("/permissions/{}/reject", id),
            &s.teacher_token,
            Some(json!({ "rejection_reason": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Alasan penolakan wajib diisi");

    let (status, rejected) = t
        .call(
            Method::POST,
            &format!("/permissions/{}/reject", id),
            &s.teacher_token,
            Some(json!({ "rejection_reason": "Tidak ada surat orang tua" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["reviewed_by"], "sari@sekolah.id");
    assert_eq!(rejected["reviewed_by_name"], "Bu Sari");
    assert_eq!(rejected["rejection_reason"], "Tidak ada surat orang tua");

    let (status, body) = t
        .call(
            Method::POST,
            &format!("/permissions/{}/approve", id),
            &s.teacher_token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Izin sudah ditinjau");

    let (_, history) = t
        .call(Method::GET, "/permissions/mine?status=rejected", &s.student_token, None)
        .await;
    assert_eq!(history["permissions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_only_the_homeroom_teacher_may_review() {
    let t = setup().await;
    let s = school(&t).await;
    let (_, permission) = submit(&t, &s.student_token, "2026-03-02", "sick").await;
    let approve = format!("/permissions/{}/approve", permission["id"].as_str().unwrap());

    let (status, _) = t.call(Method::POST, &approve, &s.student_token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = t
        .call(Method::POST, &approve, &s.other_teacher_token, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Siswa bukan anggota kelas Anda");

    let (_, pending) = t
        .call(Method::GET, "/permissions/pending", &s.other_teacher_token, None)
        .await;
    assert!(pending["permissions"].as_array().unwrap().is_empty());

    let (status, approved) = t.call(Method::POST, &approve, &s.teacher_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
}

#[tokio::test]
async fn test_teacher_dashboard_counts_class_permissions() {
    let t = setup().await;
    let s = school(&t).await;
    submit(&t, &s.student_token, "2026-03-02", "sick").await;
    submit(&t, &s.student_token, "2026-03-03", "other").await;

    let (_, pending) = t
        .call(Method::GET, "/permissions/pending", &s.teacher_token, None)
        .await;
    let first = pending["permissions"][0]["id"].as_str().unwrap().to_string();
    t.call(
        Method::POST,
        &format!("/permissions/{}/approve", first),
        &s.teacher_token,
        None,
    )
    .await;

    let (status, dash) = t
        .call(Method::GET, "/dashboard", &s.teacher_token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dash["title"], "Dashboard Wali Kelas");
    assert_eq!(dash["stats"]["total_students"], 1);
    assert_eq!(dash["stats"]["pending"], 1);
    assert_eq!(dash["stats"]["approved"], 1);

    let (_, other) = t
        .call(Method::GET, "/dashboard", &s.other_teacher_token, None)
        .await;
    assert_eq!(other["stats"]["total_permissions"], 0);

    let (_, roster) = t
        .call(Method::GET, "/my-students", &s.teacher_token, None)
        .await;
    assert_eq!(roster["class"]["name"], "X IPA 1");
    assert_eq!(roster["students"][0]["permission_count"], 2);
}

#[tokio::test]
async fn test_admin_search_and_duplicate_nis() {
    let t = setup().await;
    school(&t).await;

    let (_, found) = t
        .call(Method::GET, "/students?q=budi", &t.admin_token, None)
        .await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (_, by_class) = t
        .call(Method::GET, "/students?q=x%20ipa", &t.admin_token, None)
        .await;
    assert_eq!(by_class.as_array().unwrap().len(), 1);

    let (_, none) = t
        .call(Method::GET, "/students?q=siti", &t.admin_token, None)
        .await;
    assert!(none.as_array().unwrap().is_empty());

    let (_, classes) = t.call(Method::GET, "/classes", &t.admin_token, None).await;
    let class_id = classes[0]["id"].as_str().unwrap().to_string();
    let (status, body) = t
        .call(
            Method::POST,
            "/students",
            &t.admin_token,
            Some(json!({ "nis": "1001", "name": "Kembar", "class_id": class_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "NIS sudah terdaftar");
}

#[tokio::test]
async fn test_class_list_counts_students_and_edits_keep_permissions() {
    let t = setup().await;
    let s = school(&t).await;
    submit(&t, &s.student_token, "2026-03-02", "sick").await;

    let (_, classes) = t.call(Method::GET, "/classes", &t.admin_token, None).await;
    let ipa1 = classes
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "X IPA 1")
        .unwrap()
        .clone();
    assert_eq!(ipa1["student_count"], 1);
    assert_eq!(ipa1["teacher_name"], "Bu Sari");

    let (status, renamed) = t
        .call(
            Method::PUT,
            &format!("/classes/{}", ipa1["id"].as_str().unwrap()),
            &t.admin_token,
            Some(json!({
                "name": "X IPA Unggulan",
                "grade_level": "X",
                "teacher_id": ipa1["teacher_id"],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "X IPA Unggulan");

    // Names copied onto existing records stay as they were.
    let (_, all) = t
        .call(Method::GET, "/permissions", &t.admin_token, None)
        .await;
    assert_eq!(all[0]["class_name"], "X IPA 1");
}

#[tokio::test]
async fn test_report_export_matches_preview() {
    let t = setup().await;
    let s = school(&t).await;
    submit(&t, &s.student_token, "2026-03-02", "sick").await;
    submit(&t, &s.student_token, "2026-03-20", "school_activity").await;
    submit(&t, &s.student_token, "2026-04-05", "other").await;

    let query = "start_date=2026-03-01&end_date=2026-03-31&class_name=all&status=all";
    let (status, report) = t
        .call(Method::GET, &format!("/reports?{}", query), &t.admin_token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["stats"]["total"], 2);
    assert_eq!(report["stats"]["pending"], 2);

    let (status, csv) = t
        .raw(
            Method::GET,
            &format!("/reports/export?{}", query),
            Some(&t.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "NIS,Nama,Kelas,Tanggal Izin,Alasan,Status,Ditinjau Oleh");
    assert_eq!(lines[1], "1001,Budi Santoso,X IPA 1,20/03/2026,school_activity,pending,-");
}

#[tokio::test]
async fn test_reports_are_admin_only() {
    let t = setup().await;
    let s = school(&t).await;

    let (status, body) = t
        .call(Method::GET, "/reports", &s.teacher_token, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Anda tidak memiliki akses ke halaman ini");
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let t = setup().await;
    let s = school(&t).await;

    let (status, layout) = t
        .call(Method::GET, "/navigation", &s.student_token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(layout["initial"], "B");
    assert_eq!(layout["navigation"][1]["title"], "Ajukan Izin");

    let (status, _) = t
        .call(Method::POST, "/auth/logout", &s.student_token, None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = t
        .call(Method::GET, "/auth/me", &s.student_token, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reject_without_body_asks_for_a_reason() {
    let t = setup().await;
    let s = school(&t).await;
    let (_, permission) = submit(&t, &s.student_token, "2026-03-02", "sick").await;

    let (status, body) = t
        .call(
            Method::POST,
            &format!("/permissions/{}/reject", permission["id"].as_str().unwrap()),
            &s.teacher_token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Alasan penolakan wajib diisi");
}

#[tokio::test]
async fn test_editing_a_student_keeps_their_account() {
    let t = setup().await;
    let s = school(&t).await;

    let (_, students) = t.call(Method::GET, "/students", &t.admin_token, None).await;
    let budi = students[0].clone();

    let (status, edited) = t
        .call(
            Method::PUT,
            &format!("/students/{}", budi["id"].as_str().unwrap()),
            &t.admin_token,
            Some(json!({
                "nis": "1001",
                "name": "Budi Santoso Putra",
                "class_id": budi["class_id"],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["user_id"], budi["user_id"]);

    let (status, history) = t
        .call(Method::GET, "/permissions/mine", &s.student_token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["student"]["name"], "Budi Santoso Putra");
}

#[tokio::test]
async fn test_editing_a_missing_student_is_not_found() {
    let t = setup().await;

    let (status, body) = t
        .call(
            Method::PUT,
            "/students/missing",
            &t.admin_token,
            Some(json!({ "nis": "1001", "name": "Budi", "class_id": "c1" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Data tidak ditemukan");
}
