use crate::entities::*;
use sea_orm::*;
use std::sync::Arc;

pub mod api;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Routine {
    id: i32,
    title: String,
    description: Option<String>,
    priority: i32,
    complete: bool,
    owner_id: i32,
}

impl Routine {
    pub fn new(
        id: i32,
        title: String,
        description: Option<String>,
        priority: i32,
        complete: bool,
        owner_id: i32,
    ) -> Self {
        Self {
            id,
            title,
            description,
            priority,
            complete,
            owner_id,
        }
    }

    /// Returns the ID of the routine.
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn complete(&self) -> bool {
        self.complete
    }

    /// Returns the ID of the user who owns the routine.
    pub fn owner_id(&self) -> i32 {
        self.owner_id
    }
}

impl From<routine::Model> for Routine {
    fn from(model: routine::Model) -> Self {
        Routine::new(
            model.id,
            model.title,
            model.description,
            model.priority,
            model.complete,
            model.owner_id,
        )
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: i32,
    title: String,
    description: Option<String>,
    priority: i32,
    complete: bool,
    routine_id: i32,
}

impl Task {
    pub fn new(
        id: i32,
        title: String,
        description: Option<String>,
        priority: i32,
        complete: bool,
        routine_id: i32,
    ) -> Self {
        Self {
            id,
            title,
            description,
            priority,
            complete,
            routine_id,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn complete(&self) -> bool {
        self.complete
    }

    /// Returns the ID of the routine the task belongs to.
    pub fn routine_id(&self) -> i32 {
        self.routine_id
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.id,
            model.title,
            model.description,
            model.priority,
            model.complete,
            model.routine_id,
        )
    }
}

/// Fields of a routine chosen at creation time.
#[derive(Debug, Clone)]
pub struct NewRoutine {
    pub title: String,
    pub description: Option<String>,
    pub priority: i32,
    pub complete: bool,
}

/// Editable fields of a routine. The completion flag is not among them.
#[derive(Debug, Clone)]
pub struct RoutineEdit {
    pub title: String,
    pub description: Option<String>,
    pub priority: i32,
}

/// Editable fields of a task, also used to create one (tasks always start incomplete).
#[derive(Debug, Clone)]
pub struct TaskEdit {
    pub title: String,
    pub description: Option<String>,
    pub priority: i32,
}

/// Error type for RoutineService operations.
#[derive(Debug, thiserror::Error)]
pub enum RoutineServiceError {
    /// The routine does not exist or belongs to another user.
    #[error("Routine with ID {0} not found")]
    RoutineNotFound(i32),
    /// The task does not exist under the given routine.
    #[error("Task with ID {1} not found in routine {0}")]
    TaskNotFound(i32, i32),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Shared state for the `/routines` routes.
#[derive(Clone)]
pub struct RoutineState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

/// CRUD over routines and their tasks. Every call is scoped to `owner_id`;
/// rows belonging to other users behave as if they did not exist.
pub struct RoutineService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl RoutineService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> RoutineService<'_> {
        RoutineService { db }
    }

    /// Lists the owner's routines ordered by ID.
    #[tracing::instrument(skip(self))]
    pub async fn list_routines(&self, owner_id: i32) -> Result<Vec<Routine>, RoutineServiceError> {
        let routines = routine::Entity::find()
            .filter(routine::Column::OwnerId.eq(owner_id))
            .order_by_asc(routine::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Routine::from)
            .collect();
        Ok(routines)
    }

    /// Creates a new routine owned by `owner_id`.
    #[tracing::instrument(skip(self))]
    pub async fn create_routine(
        &self,
        owner_id: i32,
        new_routine: NewRoutine,
    ) -> Result<Routine, RoutineServiceError> {
        let active_model = routine::ActiveModel {
            title: ActiveValue::Set(new_routine.title),
            description: ActiveValue::Set(new_routine.description),
            priority: ActiveValue::Set(new_routine.priority),
            complete: ActiveValue::Set(new_routine.complete),
            owner_id: ActiveValue::Set(owner_id),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Routine::from(created_model))
    }

    /// Updates title, description and priority of a routine.
    ///
    /// # Errors
    ///
    /// [`RoutineServiceError::RoutineNotFound`] if the owner has no routine with that ID.
    #[tracing::instrument(skip(self))]
    pub async fn edit_routine(
        &self,
        owner_id: i32,
        routine_id: i32,
        edit: RoutineEdit,
    ) -> Result<Routine, RoutineServiceError> {
        let routine_to_update = self.find_owned_routine(owner_id, routine_id).await?;

        let mut active_model: routine::ActiveModel = routine_to_update.into();
        active_model.title = ActiveValue::Set(edit.title);
        active_model.description = ActiveValue::Set(edit.description);
        active_model.priority = ActiveValue::Set(edit.priority);
        let updated_model = active_model.update(self.db).await?;

        Ok(Routine::from(updated_model))
    }

    /// Deletes a routine and, through the foreign key, its tasks.
    /// Deleting a routine that is not there is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_routine(
        &self,
        owner_id: i32,
        routine_id: i32,
    ) -> Result<(), RoutineServiceError> {
        let result = routine::Entity::delete_many()
            .filter(routine::Column::Id.eq(routine_id))
            .filter(routine::Column::OwnerId.eq(owner_id))
            .exec(self.db)
            .await?;
        tracing::debug!("Deleted {} routine(s)", result.rows_affected);
        Ok(())
    }

    /// Lists the tasks of one of the owner's routines, ordered by ID.
    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(
        &self,
        owner_id: i32,
        routine_id: i32,
    ) -> Result<Vec<Task>, RoutineServiceError> {
        self.find_owned_routine(owner_id, routine_id).await?;

        let tasks = task::Entity::find()
            .filter(task::Column::RoutineId.eq(routine_id))
            .order_by_asc(task::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Adds a task to one of the owner's routines. New tasks are never complete.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(
        &self,
        owner_id: i32,
        routine_id: i32,
        new_task: TaskEdit,
    ) -> Result<Task, RoutineServiceError> {
        self.find_owned_routine(owner_id, routine_id).await?;

        let active_model = task::ActiveModel {
            title: ActiveValue::Set(new_task.title),
            description: ActiveValue::Set(new_task.description),
            priority: ActiveValue::Set(new_task.priority),
            complete: ActiveValue::Set(false),
            routine_id: ActiveValue::Set(routine_id),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Task::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_task(
        &self,
        owner_id: i32,
        routine_id: i32,
        task_id: i32,
    ) -> Result<Task, RoutineServiceError> {
        self.find_owned_routine(owner_id, routine_id).await?;
        let task_model = self.find_task(routine_id, task_id).await?;
        Ok(Task::from(task_model))
    }

    /// Updates title, description and priority of a task.
    ///
    /// # Errors
    ///
    /// [`RoutineServiceError::TaskNotFound`] if the routine has no task with that ID.
    #[tracing::instrument(skip(self))]
    pub async fn edit_task(
        &self,
        owner_id: i32,
        routine_id: i32,
        task_id: i32,
        edit: TaskEdit,
    ) -> Result<Task, RoutineServiceError> {
        self.find_owned_routine(owner_id, routine_id).await?;
        let task_to_update = self.find_task(routine_id, task_id).await?;

        let mut active_model: task::ActiveModel = task_to_update.into();
        active_model.title = ActiveValue::Set(edit.title);
        active_model.description = ActiveValue::Set(edit.description);
        active_model.priority = ActiveValue::Set(edit.priority);
        let updated_model = active_model.update(self.db).await?;

        Ok(Task::from(updated_model))
    }

    /// Deletes a task. Missing tasks, and tasks under someone else's routine, are ignored.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(
        &self,
        owner_id: i32,
        routine_id: i32,
        task_id: i32,
    ) -> Result<(), RoutineServiceError> {
        let owned_routine = routine::Entity::find()
            .select_only()
            .column(routine::Column::Id)
            .filter(routine::Column::Id.eq(routine_id))
            .filter(routine::Column::OwnerId.eq(owner_id));

        let result = task::Entity::delete_many()
            .filter(task::Column::Id.eq(task_id))
            .filter(task::Column::RoutineId.in_subquery(owned_routine.into_query()))
            .exec(self.db)
            .await?;
        tracing::debug!("Deleted {} task(s)", result.rows_affected);
        Ok(())
    }

    async fn find_owned_routine(
        &self,
        owner_id: i32,
        routine_id: i32,
    ) -> Result<routine::Model, RoutineServiceError> {
        routine::Entity::find_by_id(routine_id)
            .filter(routine::Column::OwnerId.eq(owner_id))
            .one(self.db)
            .await?
            .ok_or(RoutineServiceError::RoutineNotFound(routine_id))
    }

    async fn find_task(
        &self,
        routine_id: i32,
        task_id: i32,
    ) -> Result<task::Model, RoutineServiceError> {
        task::Entity::find_by_id(task_id)
            .filter(task::Column::RoutineId.eq(routine_id))
            .one(self.db)
            .await?
            .ok_or(RoutineServiceError::TaskNotFound(routine_id, task_id))
    }
}
