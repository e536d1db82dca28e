//! Shared fixtures for integration tests.

use chrono::NaiveDate;
use liftlog::exercises::ExerciseDraft;
use liftlog::programs::{ProgramDraft, RowDraft};
use liftlog::sessions::SetDraft;
use liftlog::{Logbook, PersonalBest};
use uuid::Uuid;

/// A logbook with one registered user and a one-template program.
pub struct Gym {
    pub logbook: Logbook,
    pub user: Uuid,
    pub program: Uuid,
    pub template: Uuid,
}

impl Gym {
    pub fn new() -> Self {
        let mut logbook = Logbook::in_memory().expect("in-memory logbook");
        let user = logbook
            .register_user("lifter@example.com", "lifter", "Lifter")
            .unwrap()
            .id;
        let program = logbook
            .create_program(user, &ProgramDraft::named("Base"))
            .unwrap()
            .id;
        let template = logbook.create_template(user, program, "Day 1").unwrap().id;
        Self {
            logbook,
            user,
            program,
            template,
        }
    }

    pub fn register(&mut self, username: &str) -> Uuid {
        self.logbook
            .register_user(&format!("{username}@example.com"), username, username)
            .unwrap()
            .id
    }

    /// Create an exercise for `owner` and add it as a row of `template`.
    pub fn exercise_in(&mut self, owner: Uuid, template: Uuid, name: &str) -> Uuid {
        let exercise = self
            .logbook
            .create_exercise(owner, &ExerciseDraft::named(name))
            .unwrap()
            .id;
        self.logbook
            .add_row(owner, template, &RowDraft::for_exercise(exercise))
            .unwrap();
        exercise
    }

    /// Run a finished session of `sets` on `day` of May 2024.
    pub fn train(&mut self, day: u32, sets: &[(Uuid, f64, u32)]) -> Vec<PersonalBest> {
        let session = self
            .logbook
            .start_session(self.user, self.template, Some(date(day)))
            .unwrap();
        for (number, &(exercise, weight, reps)) in sets.iter().enumerate() {
            let mut draft = SetDraft::new(exercise, weight, reps);
            draft.set_number = number as u32 + 1;
            self.logbook.log_set(self.user, session.id, &draft).unwrap();
        }
        self.logbook
            .finish_session(self.user, session.id)
            .unwrap()
            .personal_bests
    }
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).expect("valid day")
}
