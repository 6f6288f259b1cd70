use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::DataNotAvailable;
use crate::repository::TasksRepository;
use crate::repository::table::TaskTable;
use crate::task::Task;

#[derive(Debug, Default)]
struct Cache {
    tasks: TaskTable,
    dirty: bool,
}

/// Combines a local and a remote source behind an in-memory cache. Reads
/// prefer the cache, then local, then remote; writes go everywhere.
#[derive(Debug)]
pub struct CachedRepository<L, R> {
    local: L,
    remote: R,
    cache: Mutex<Cache>,
}

impl<L, R> CachedRepository<L, R>
where
    L: TasksRepository,
    R: TasksRepository,
{
    pub fn new(local: L, remote: R) -> Self {
        Self {
            local,
            remote,
            cache: Mutex::new(Cache::default()),
        }
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn is_cache_dirty(&self) -> bool {
        self.cache.lock().dirty
    }

    fn cached_tasks(&self) -> Option<Vec<Task>> {
        let cache = self.cache.lock();
        if cache.dirty || cache.tasks.is_empty() {
            None
        } else {
            Some(cache.tasks.all())
        }
    }

    fn refresh_cache(&self, tasks: &[Task]) {
        let mut cache = self.cache.lock();
        cache.tasks.replace_all(tasks);
        cache.dirty = false;
    }

    async fn refresh_local(&self, tasks: &[Task]) {
        self.local.delete_all_tasks().await;
        for task in tasks {
            self.local.save_task(task.clone()).await;
        }
    }

    async fn tasks_from_remote(&self) -> Result<Vec<Task>, DataNotAvailable> {
        let tasks = self.remote.get_tasks().await?;
        info!(count = tasks.len(), "loaded tasks from remote");
        self.refresh_cache(&tasks);
        self.refresh_local(&tasks).await;
        Ok(tasks)
    }
}

impl<L, R> TasksRepository for CachedRepository<L, R>
where
    L: TasksRepository,
    R: TasksRepository,
{
    #[tracing::instrument(skip(self))]
    async fn get_task(&self, task_id: &str) -> Result<Task, DataNotAvailable> {
        let cached = self.cache.lock().tasks.get(task_id);
        if let Some(task) = cached {
            debug!("task served from cache");
            return Ok(task);
        }

        let task = match self.local.get_task(task_id).await {
            Ok(task) => task,
            Err(DataNotAvailable) => self.remote.get_task(task_id).await?,
        };
        self.cache.lock().tasks.upsert(task.clone());
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    async fn get_tasks(&self) -> Result<Vec<Task>, DataNotAvailable> {
        if let Some(tasks) = self.cached_tasks() {
            debug!(count = tasks.len(), "tasks served from cache");
            return Ok(tasks);
        }

        let dirty = self.cache.lock().dirty;
        if dirty {
            return self.tasks_from_remote().await;
        }

        match self.local.get_tasks().await {
            Ok(tasks) => {
                self.refresh_cache(&tasks);
                Ok(tasks)
            }
            Err(DataNotAvailable) => {
                debug!("local source empty, falling back to remote");
                self.tasks_from_remote().await
            }
        }
    }

    #[tracing::instrument(skip(self, task), fields(id = %task.id))]
    async fn save_task(&self, task: Task) {
        self.remote.save_task(task.clone()).await;
        self.local.save_task(task.clone()).await;
        self.cache.lock().tasks.upsert(task);
    }

    #[tracing::instrument(skip(self))]
    async fn complete_task(&self, task_id: &str) {
        self.remote.complete_task(task_id).await;
        self.local.complete_task(task_id).await;
        self.cache.lock().tasks.set_completed(task_id, true);
    }

    #[tracing::instrument(skip(self))]
    async fn activate_task(&self, task_id: &str) {
        self.remote.activate_task(task_id).await;
        self.local.activate_task(task_id).await;
        self.cache.lock().tasks.set_completed(task_id, false);
    }

    #[tracing::instrument(skip(self))]
    async fn clear_completed_tasks(&self) {
        self.remote.clear_completed_tasks().await;
        self.local.clear_completed_tasks().await;
        self.cache.lock().tasks.retain_active();
    }

    #[tracing::instrument(skip(self))]
    async fn delete_task(&self, task_id: &str) {
        self.remote.delete_task(task_id).await;
        self.local.delete_task(task_id).await;
        self.cache.lock().tasks.remove(task_id);
    }

    #[tracing::instrument(skip(self))]
    async fn delete_all_tasks(&self) {
        self.remote.delete_all_tasks().await;
        self.local.delete_all_tasks().await;
        self.cache.lock().tasks.clear();
    }

    #[tracing::instrument(skip(self))]
    async fn refresh_tasks(&self) {
        self.cache.lock().dirty = true;
    }
}
