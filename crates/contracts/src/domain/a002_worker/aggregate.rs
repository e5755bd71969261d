use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateForm, AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::validation::{FieldErrors, ValidationRules};

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Worker id
    WorkerId
);

/// Minimum length of a national id (cédula)
pub const NATIONAL_ID_MIN_LENGTH: usize = 8;

// ============================================================================
// Aggregate Root
// ============================================================================

/// Store employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    #[serde(flatten)]
    pub base: BaseAggregate<WorkerId>,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// National identity document number, unique
    pub national_id: String,
    /// Internal employee code, unique
    pub employee_code: String,
    pub image: Option<String>,
}

impl Worker {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    fn from_data(data: WorkerData) -> Self {
        Self {
            base: BaseAggregate::new(WorkerId::new_v4()),
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
            national_id: data.national_id,
            employee_code: data.employee_code,
            image: data.image,
        }
    }

    fn assign(&mut self, data: WorkerData) {
        self.first_name = data.first_name;
        self.last_name = data.last_name;
        self.email = data.email;
        self.national_id = data.national_id;
        self.employee_code = data.employee_code;
        self.image = data.image;
    }
}

impl AggregateRoot for Worker {
    type Id = WorkerId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "worker"
    }

    fn element_name() -> &'static str {
        "Worker"
    }

    fn list_name() -> &'static str {
        "Workers"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Raw worker form as submitted
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorkerForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub national_id: String,
    pub employee_code: String,
    pub image: Option<String>,
}

/// Cleaned worker values
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub national_id: String,
    pub employee_code: String,
    pub image: Option<String>,
}

impl WorkerForm {
    pub fn clean(&self) -> Result<WorkerData, FieldErrors> {
        let mut errors = FieldErrors::new();

        let first_name = errors.text(
            "first_name",
            &self.first_name,
            ValidationRules::required().max_length(100),
        );
        let last_name = errors.text(
            "last_name",
            &self.last_name,
            ValidationRules::required().max_length(100),
        );
        let email = errors.email("email", &self.email, 254);
        let national_id = errors.text(
            "national_id",
            &self.national_id,
            ValidationRules::required().max_length(20),
        );
        if !national_id.is_empty() && !errors.has("national_id") {
            if !national_id.chars().all(|c| c.is_ascii_digit()) {
                errors.add("national_id", "National ID must contain only digits.");
            } else if national_id.len() < NATIONAL_ID_MIN_LENGTH {
                errors.add(
                    "national_id",
                    format!(
                        "National ID must have at least {} digits.",
                        NATIONAL_ID_MIN_LENGTH
                    ),
                );
            }
        }
        let employee_code = errors.text(
            "employee_code",
            &self.employee_code,
            ValidationRules::required().max_length(20),
        );
        let image = errors.image("image", self.image.as_deref());

        errors.into_result(WorkerData {
            first_name,
            last_name,
            email,
            national_id,
            employee_code,
            image,
        })
    }
}

impl AggregateForm for WorkerForm {
    type Aggregate = Worker;

    fn create(&self) -> Result<Worker, FieldErrors> {
        self.clean().map(Worker::from_data)
    }

    fn apply_to(&self, worker: &mut Worker) -> Result<(), FieldErrors> {
        let data = self.clean()?;
        worker.assign(data);
        Ok(())
    }

    fn from_aggregate(worker: &Worker) -> Self {
        Self {
            first_name: worker.first_name.clone(),
            last_name: worker.last_name.clone(),
            email: worker.email.clone(),
            national_id: worker.national_id.clone(),
            employee_code: worker.employee_code.clone(),
            image: worker.image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> WorkerForm {
        WorkerForm {
            first_name: "María".into(),
            last_name: "González".into(),
            email: "maria.gonzalez@bella.ec".into(),
            national_id: "1712345678".into(),
            employee_code: "EMP001".into(),
            image: None,
        }
    }

    #[test]
    fn test_valid_form_creates_worker() {
        let worker = form().create().unwrap();
        assert_eq!(worker.full_name(), "María González");
        assert_eq!(worker.base.metadata.version, 0);
    }

    #[test]
    fn test_invalid_email() {
        let mut f = form();
        f.email = "invalid-email".into();
        assert!(f.clean().unwrap_err().has("email"));
    }

    #[test]
    fn test_national_id_rules() {
        let mut f = form();
        f.national_id = "17123A5678".into();
        assert_eq!(
            f.clean().unwrap_err().get("national_id"),
            ["National ID must contain only digits.".to_string()]
        );

        f.national_id = "1234567".into();
        assert_eq!(
            f.clean().unwrap_err().get("national_id"),
            ["National ID must have at least 8 digits.".to_string()]
        );

        f.national_id = "12345678".into();
        assert!(f.clean().is_ok());

        f.national_id = "1".repeat(21);
        assert!(f.clean().unwrap_err().has("national_id"));
    }

    #[test]
    fn test_missing_required_fields() {
        let errors = WorkerForm::default().clean().unwrap_err();
        for field in ["first_name", "last_name", "email", "national_id", "employee_code"] {
            assert!(errors.has(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_apply_leaves_worker_untouched_on_error() {
        let mut worker = form().create().unwrap();
        let mut update = WorkerForm::from_aggregate(&worker);
        update.first_name = "Ana".into();
        update.email = "broken".into();
        assert!(update.apply_to(&mut worker).is_err());
        assert_eq!(worker.first_name, "María");

        update.email = "ana@bella.ec".into();
        update.apply_to(&mut worker).unwrap();
        assert_eq!(worker.first_name, "Ana");
    }

    #[test]
    fn test_optional_image() {
        let mut f = form();
        f.image = Some("/media/workers/maria.jpg".into());
        let worker = f.create().unwrap();
        assert_eq!(worker.image.as_deref(), Some("/media/workers/maria.jpg"));
    }
}
