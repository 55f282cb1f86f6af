use dotenvy::dotenv;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::env;

fn is_dry_run() -> bool {
    !std::env::args().any(|a| a == "--apply")
}

fn roster_path() -> String {
    std::env::args()
        .skip(1)
        .find(|a| !a.starts_with("--"))
        .unwrap_or_else(|| "roster.json".to_string())
}

#[derive(Debug, Deserialize)]
struct Roster {
    classes: Vec<RosterClass>,
}

#[derive(Debug, Deserialize)]
struct RosterClass {
    name: String,
    grade_level: String,
    teacher_email: String,
    #[serde(default)]
    students: Vec<RosterStudent>,
}

#[derive(Debug, Deserialize)]
struct RosterStudent {
    nis: String,
    name: String,
    parent_phone: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Remote {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    nis: String,
}

struct Api {
    client: Client,
    base: String,
    token: String,
}

impl Api {
    async fn list(&self, path: &str) -> Result<Vec<Remote>, Box<dyn std::error::Error>> {
        let items = self
            .client
            .get(format!("{}{}", self.base, path))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(items)
    }

    async fn create(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<Remote, Box<dyn std::error::Error>> {
        let created = self
            .client
            .post(format!("{}{}", self.base, path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(created)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let api = Api {
        client: Client::new(),
        base: env::var("API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string()),
        token: env::var("API_TOKEN")?,
    };

    let roster: Roster = serde_json::from_str(&std::fs::read_to_string(roster_path())?)?;
    let dry_run = is_dry_run();

    let teachers: HashMap<String, String> = api
        .list("/users?role=teacher")
        .await?
        .into_iter()
        .map(|u| (u.email, u.id))
        .collect();
    let mut classes: HashMap<String, String> = api
        .list("/classes")
        .await?
        .into_iter()
        .map(|c| (c.name, c.id))
        .collect();
    let known_nis: HashSet<String> = api
        .list("/students")
        .await?
        .into_iter()
        .map(|s| s.nis)
        .collect();

    let mut classes_created = 0;
    let mut students_created = 0;
    let mut skipped = 0;

    for class in &roster.classes {
        let Some(teacher_id) = teachers.get(&class.teacher_email) else {
            println!(
                "Skipping class {}: no teacher account for {}",
                class.name, class.teacher_email
            );
            skipped += 1;
            continue;
        };

        let class_id = match classes.get(&class.name) {
            Some(id) => Some(id.clone()),
            None if dry_run => {
                println!("[DRY RUN] Would create class {}", class.name);
                classes_created += 1;
                None
            }
            None => {
                let created = api
                    .create(
                        "/classes",
                        json!({
                            "name": class.name,
                            "grade_level": class.grade_level,
                            "teacher_id": teacher_id,
                        }),
                    )
                    .await?;
                println!("Created class {} -> {}", class.name, created.id);
                classes.insert(class.name.clone(), created.id.clone());
                classes_created += 1;
                Some(created.id)
            }
        };

        for student in &class.students {
            if known_nis.contains(&student.nis) {
                skipped += 1;
                continue;
            }

            match &class_id {
                Some(class_id) if !dry_run => {
                    let created = api
                        .create(
                            "/students",
                            json!({
                                "nis": student.nis,
                                "name": student.name,
                                "class_id": class_id,
                                "parent_phone": student.parent_phone,
                                "user_id": student.user_id,
                            }),
                        )
                        .await?;
                    println!("Created student {} -> {}", student.nis, created.id);
                }
                _ => println!(
                    "[DRY RUN] Would create student {} ({}) in {}",
                    student.nis, student.name, class.name
                ),
            }
            students_created += 1;
        }
    }

    println!(
        "Classes created: {}, students created: {}, skipped: {}",
        classes_created, students_created, skipped
    );

    Ok(())
}
