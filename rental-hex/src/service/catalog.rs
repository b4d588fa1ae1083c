//! Package and car catalog.

use std::sync::Arc;

use rental_types::{
    AppError, Car, CarId, CarQuery, CatalogRepository, CatalogSeed, CreateCarRequest,
    CreatePackageRequest, DomainError, Package, Page, RepoError,
};

use super::reject;

/// Counts of what a catalog import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub packages_created: usize,
    pub cars_created: usize,
    pub skipped: usize,
}

pub struct CatalogService<R: CatalogRepository> {
    repo: Arc<R>,
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} cannot be empty")).into());
    }
    Ok(())
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// All packages, cheapest first.
    pub async fn list_packages(&self) -> Result<Vec<Package>, AppError> {
        self.repo
            .list_packages()
            .await
            .map_err(|e| reject("list_packages", e))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_cars(&self, query: CarQuery) -> Result<Page<Car>, AppError> {
        query.validate()?;

        self.repo
            .list_cars(&query)
            .await
            .map_err(|e| reject("list_cars", e))
    }

    pub async fn get_car(&self, id: CarId) -> Result<Car, AppError> {
        self.repo
            .get_car(id)
            .await
            .map_err(|e| reject("get_car", e))?
            .ok_or_else(|| DomainError::CarNotFound(id).into())
    }

    #[tracing::instrument(skip(self, req), fields(name = %req.name))]
    pub async fn create_package(&self, req: CreatePackageRequest) -> Result<Package, AppError> {
        require("package name", &req.name)?;

        let package = self
            .repo
            .create_package(req)
            .await
            .map_err(|e| reject("create_package", e))?;

        tracing::info!(package_id = %package.id, "Package created");
        Ok(package)
    }

    #[tracing::instrument(skip(self, req), fields(registration = %req.registration_number))]
    pub async fn create_car(&self, req: CreateCarRequest) -> Result<Car, AppError> {
        require("registration number", &req.registration_number)?;
        require("brand", &req.brand)?;
        require("model", &req.model)?;

        let car = self
            .repo
            .create_car(req)
            .await
            .map_err(|e| reject("create_car", e))?;

        tracing::info!(car_id = %car.id, "Car created");
        Ok(car)
    }

    /// Loads a seed into the catalog. Packages and cars that already exist
    /// are skipped, so importing the same seed twice is a no-op.
    #[tracing::instrument(skip_all, fields(packages = seed.packages.len(), cars = seed.cars.len()))]
    pub async fn import(&self, seed: CatalogSeed) -> Result<ImportSummary, AppError> {
        let mut summary = ImportSummary::default();

        for package in seed.packages {
            let existing = self
                .repo
                .find_package(&package.name)
                .await
                .map_err(|e| reject("import", e))?;

            if existing.is_some() {
                summary.skipped += 1;
                continue;
            }
            self.create_package(package).await?;
            summary.packages_created += 1;
        }

        for car in seed.cars {
            match self.repo.create_car(car).await {
                Ok(_) => summary.cars_created += 1,
                Err(RepoError::Conflict(_)) => summary.skipped += 1,
                Err(e) => return Err(reject("import", e)),
            }
        }

        tracing::info!(?summary, "Catalog imported");
        Ok(summary)
    }
}
