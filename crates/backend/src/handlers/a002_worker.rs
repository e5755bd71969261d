use contracts::domain::a002_worker::aggregate::{Worker, WorkerForm};

use super::crud::CrudResource;
use crate::domain::a002_worker::repository::WorkerRepository;
use crate::shared::state::AppState;

pub struct WorkerResource;

impl CrudResource for WorkerResource {
    type Aggregate = Worker;
    type Repository = WorkerRepository;
    type Form = WorkerForm;

    const BASE_PATH: &'static str = "/worker";
    const PAGE_SIZE: u64 = 8;

    fn repository(state: &AppState) -> WorkerRepository {
        WorkerRepository::new(state.db.clone())
    }

    fn present(worker: &Worker) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(worker)?;
        value["full_name"] = worker.full_name().into();
        Ok(value)
    }
}
