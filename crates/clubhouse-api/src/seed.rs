use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use clubhouse_db::Database;
use clubhouse_db::models::{ActivityRow, AnnouncementRow};

use crate::auth::hash_password;

/// (username, display name, password, role)
const TEACHERS: &[(&str, &str, &str, &str)] = &[
    ("mrodriguez", "Ms. Rodriguez", "art123", "teacher"),
    ("mchen", "Mr. Chen", "chess456", "teacher"),
    ("principal", "Principal Martinez", "admin789", "admin"),
];

struct SeedActivity {
    name: &'static str,
    description: &'static str,
    schedule: &'static str,
    days: &'static [&'static str],
    start_time: &'static str,
    end_time: &'static str,
    max_participants: i64,
    participants: &'static [&'static str],
}

const ACTIVITIES: &[SeedActivity] = &[
    SeedActivity {
        name: "Chess Club",
        description: "Learn strategies and compete in chess tournaments",
        schedule: "Mondays and Fridays, 3:15 PM - 4:45 PM",
        days: &["Monday", "Friday"],
        start_time: "15:15",
        end_time: "16:45",
        max_participants: 12,
        participants: &["michael@school.edu", "daniel@school.edu"],
    },
    SeedActivity {
        name: "Programming Class",
        description: "Learn programming fundamentals and build software projects",
        schedule: "Tuesdays and Thursdays, 7:00 AM - 8:00 AM",
        days: &["Tuesday", "Thursday"],
        start_time: "07:00",
        end_time: "08:00",
        max_participants: 20,
        participants: &["emma@school.edu", "sophia@school.edu"],
    },
    SeedActivity {
        name: "Morning Fitness",
        description: "Early morning physical training and exercises",
        schedule: "Mondays, Wednesdays, Fridays, 6:30 AM - 7:45 AM",
        days: &["Monday", "Wednesday", "Friday"],
        start_time: "06:30",
        end_time: "07:45",
        max_participants: 30,
        participants: &["john@school.edu", "olivia@school.edu"],
    },
    SeedActivity {
        name: "Soccer Team",
        description: "Join the school soccer team and compete in matches",
        schedule: "Tuesdays and Thursdays, 3:30 PM - 5:30 PM",
        days: &["Tuesday", "Thursday"],
        start_time: "15:30",
        end_time: "17:30",
        max_participants: 22,
        participants: &["liam@school.edu", "noah@school.edu"],
    },
    SeedActivity {
        name: "Art Club",
        description: "Explore various art techniques and create masterpieces",
        schedule: "Thursdays, 3:15 PM - 5:00 PM",
        days: &["Thursday"],
        start_time: "15:15",
        end_time: "17:00",
        max_participants: 15,
        participants: &["amelia@school.edu", "harper@school.edu"],
    },
    SeedActivity {
        name: "Drama Club",
        description: "Act, direct, and produce plays and performances",
        schedule: "Mondays and Wednesdays, 3:30 PM - 5:30 PM",
        days: &["Monday", "Wednesday"],
        start_time: "15:30",
        end_time: "17:30",
        max_participants: 20,
        participants: &["ella@school.edu", "scarlett@school.edu"],
    },
    SeedActivity {
        name: "Math Club",
        description: "Solve challenging problems and prepare for math competitions",
        schedule: "Tuesdays, 7:15 AM - 8:00 AM",
        days: &["Tuesday"],
        start_time: "07:15",
        end_time: "08:00",
        max_participants: 10,
        participants: &["james@school.edu", "benjamin@school.edu"],
    },
    SeedActivity {
        name: "Weekend Robotics Workshop",
        description: "Build and program robots in our state-of-the-art workshop",
        schedule: "Saturdays, 10:00 AM - 2:00 PM",
        days: &["Saturday"],
        start_time: "10:00",
        end_time: "14:00",
        max_participants: 15,
        participants: &["ethan@school.edu", "oliver@school.edu"],
    },
    SeedActivity {
        name: "Sunday Chess Tournament",
        description: "Weekly tournament for serious chess players with rankings",
        schedule: "Sundays, 2:00 PM - 5:00 PM",
        days: &["Sunday"],
        start_time: "14:00",
        end_time: "17:00",
        max_participants: 16,
        participants: &["william@school.edu", "jacob@school.edu"],
    },
];

/// Insert demo teachers, activities and a welcome announcement into empty
/// tables. Tables that already hold rows are left alone.
pub fn seed_if_empty(db: &Database) -> Result<()> {
    if db.count_teachers()? == 0 {
        for (username, display_name, password, role) in TEACHERS {
            db.create_teacher(username, display_name, &hash_password(password)?, role)?;
        }
        info!("Seeded {} teachers", TEACHERS.len());
    }

    if db.count_activities()? == 0 {
        for seed in ACTIVITIES {
            db.insert_activity(&ActivityRow {
                name: seed.name.into(),
                description: seed.description.into(),
                schedule: seed.schedule.into(),
                days: Some(serde_json::to_string(seed.days)?),
                start_time: Some(seed.start_time.into()),
                end_time: Some(seed.end_time.into()),
                max_participants: seed.max_participants,
            })?;
            for email in seed.participants {
                db.enroll(seed.name, email)?;
            }
        }
        info!("Seeded {} activities", ACTIVITIES.len());
    }

    if db.count_announcements()? == 0 {
        let now = chrono::Local::now();
        let expires = now.date_naive() + chrono::Days::new(30);
        db.insert_announcement(&AnnouncementRow {
            id: Uuid::new_v4().to_string(),
            message: "Activity registration is open! Sign up before the spots fill up.".into(),
            start_date: None,
            expiration_date: expires.format("%Y-%m-%d").to_string(),
            created_by: "principal".into(),
            created_at: now.naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            updated_by: None,
            updated_at: None,
        })?;
        info!("Seeded welcome announcement");
    }

    Ok(())
}
