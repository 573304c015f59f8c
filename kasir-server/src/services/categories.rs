//! Category service

use std::sync::Arc;

use async_trait::async_trait;

use super::ServiceError;
use crate::models::{CategoryRequest, CategoryResponse, HealthCheck};
use crate::repos::CategoryRepository;

#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn create_category(&self, request: &CategoryRequest) -> Result<(), ServiceError>;

    /// Fails with [`ServiceError::CategoryNotFound`] before writing anything
    async fn update_category(&self, id: i64, request: &CategoryRequest) -> Result<(), ServiceError>;

    async fn delete_category(&self, id: i64) -> Result<(), ServiceError>;

    async fn get_category_by_id(&self, id: i64) -> Result<CategoryResponse, ServiceError>;

    async fn get_all_categories(&self) -> Result<Vec<CategoryResponse>, ServiceError>;

    /// Liveness of the categories API itself
    fn api(&self) -> HealthCheck;
}

pub struct DefaultCategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl DefaultCategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    async fn ensure_exists(&self, id: i64) -> Result<(), ServiceError> {
        match self.repo.get_category_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::CategoryNotFound),
        }
    }
}

#[async_trait]
impl CategoryService for DefaultCategoryService {
    async fn create_category(&self, request: &CategoryRequest) -> Result<(), ServiceError> {
        self.repo.create_category(request).await?;
        Ok(())
    }

    async fn update_category(&self, id: i64, request: &CategoryRequest) -> Result<(), ServiceError> {
        self.ensure_exists(id).await?;
        self.repo.update_category(id, request).await?;
        Ok(())
    }

    async fn delete_category(&self, id: i64) -> Result<(), ServiceError> {
        self.ensure_exists(id).await?;
        self.repo.delete_category(id).await?;
        Ok(())
    }

    async fn get_category_by_id(&self, id: i64) -> Result<CategoryResponse, ServiceError> {
        self.repo
            .get_category_by_id(id)
            .await?
            .map(CategoryResponse::from)
            .ok_or(ServiceError::CategoryNotFound)
    }

    async fn get_all_categories(&self) -> Result<Vec<CategoryResponse>, ServiceError> {
        let categories = self.repo.get_all_categories().await?;
        Ok(categories.into_iter().map(CategoryResponse::from).collect())
    }

    fn api(&self) -> HealthCheck {
        HealthCheck::healthy("Categories API")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use kasir_db::DbError;

    use crate::models::Category;

    /// In-memory repository recording the writes it receives
    #[derive(Default)]
    struct MockRepo {
        rows: Vec<Category>,
        fail_reads: bool,
        writes: Mutex<Vec<String>>,
    }

    impl MockRepo {
        fn with(rows: Vec<Category>) -> Self {
            Self {
                rows,
                ..Self::default()
            }
        }

        fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CategoryRepository for MockRepo {
        async fn create_category(&self, category: &CategoryRequest) -> Result<(), DbError> {
            self.writes.lock().unwrap().push(format!("create {}", category.name));
            Ok(())
        }

        async fn update_category(&self, id: i64, _: &CategoryRequest) -> Result<(), DbError> {
            self.writes.lock().unwrap().push(format!("update {id}"));
            Ok(())
        }

        async fn delete_category(&self, id: i64) -> Result<(), DbError> {
            self.writes.lock().unwrap().push(format!("delete {id}"));
            Ok(())
        }

        async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>, DbError> {
            if self.fail_reads {
                return Err(DbError::driver("connection reset"));
            }
            Ok(self.rows.iter().find(|c| c.id == id).cloned())
        }

        async fn get_all_categories(&self) -> Result<Vec<Category>, DbError> {
            if self.fail_reads {
                return Err(DbError::driver("connection reset"));
            }
            Ok(self.rows.clone())
        }
    }

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.into(),
            ..Category::default()
        }
    }

    fn request() -> CategoryRequest {
        CategoryRequest {
            name: "Minuman".into(),
            description: String::new(),
        }
    }

    fn service(repo: MockRepo) -> (DefaultCategoryService, Arc<MockRepo>) {
        let repo = Arc::new(repo);
        (DefaultCategoryService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn create_delegates_to_repository() {
        let (service, repo) = service(MockRepo::default());
        service.create_category(&request()).await.unwrap();
        assert_eq!(repo.writes(), vec!["create Minuman"]);
    }

    #[tokio::test]
    async fn update_requires_existing_category() {
        let (service, repo) = service(MockRepo::with(vec![category(1, "Makanan")]));

        let err = service.update_category(2, &request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::CategoryNotFound));
        assert!(repo.writes().is_empty());

        service.update_category(1, &request()).await.unwrap();
        assert_eq!(repo.writes(), vec!["update 1"]);
    }

    #[tokio::test]
    async fn delete_requires_existing_category() {
        let (service, repo) = service(MockRepo::with(vec![category(1, "Makanan")]));
        assert_eq!(
            service.delete_category(9).await.unwrap_err().to_string(),
            "category not found"
        );
        service.delete_category(1).await.unwrap();
        assert_eq!(repo.writes(), vec!["delete 1"]);
    }

    #[tokio::test]
    async fn lookup_errors_are_not_reported_as_missing() {
        let (service, repo) = service(MockRepo {
            fail_reads: true,
            ..MockRepo::default()
        });
        let err = service.delete_category(1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Repository(_)));
        assert_eq!(err.to_string(), "connection reset");
        assert!(repo.writes().is_empty());
    }

    #[tokio::test]
    async fn reads_convert_to_responses() {
        let (service, _) = service(MockRepo::with(vec![
            category(1, "Makanan"),
            category(2, "Minuman"),
        ]));

        assert_eq!(service.get_category_by_id(2).await.unwrap().name, "Minuman");
        assert!(service.get_category_by_id(3).await.unwrap_err().is_not_found());
        assert_eq!(service.get_all_categories().await.unwrap().len(), 2);
    }

    #[test]
    fn api_is_healthy() {
        let (service, _) = service(MockRepo::default());
        assert_eq!(service.api(), HealthCheck::healthy("Categories API"));
    }
}
