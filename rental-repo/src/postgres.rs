//! PostgreSQL repository adapter.
//!
//! Orders and pickups lock the caller's user row first, so two requests of
//! the same user run one after the other. Cars are claimed with a guarded
//! UPDATE so two users can never both take the same car.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use rental_types::{
    AttachCardRequest, Car, CarId, CarQuery, CatalogRepository, CreateCarRequest,
    CreatePackageRequest, CreditCard, CreditCardId, DomainError, Money, NewUser, Package,
    PackageId, Page, PaymentRepository, Pickup, RentalId, RentalRecord, RentalRepository,
    RepoError, Reservation, ReservationId, Session, SessionId, SubmitOrderRequest, User, UserId,
    UserRepository,
};

use crate::types::{
    COUNT_CARS, DbCar, DbCreditCard, DbPackage, DbRental, DbReservation, DbUser, SELECT_CAR,
    SELECT_CARD, SELECT_PACKAGE, SELECT_RENTAL, SELECT_RESERVATION, SELECT_USER, car_sort_column,
    sort_keyword,
};
use crate::{db_error, is_unique_violation, reservation_insert_error, tx_error};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository with row-level locking.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    tracing::debug!(migration = name, "Migration applied");
    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        execute_migration(
            &pool,
            include_str!("../migrations/0001_create_tables_pg.sql"),
            "0001",
        )
        .await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        execute_migration(
            &self.pool,
            include_str!("../migrations/0001_create_tables_pg.sql"),
            "0001",
        )
        .await
        .map_err(|e| RepoError::Database(e.to_string()))
    }
}

fn push_car_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &CarQuery) {
    let mut keyword = " WHERE ";
    if let Some(available) = query.available {
        builder.push(keyword).push("c.available = ").push_bind(available);
        keyword = " AND ";
    }
    if let Some(package) = &query.package {
        builder.push(keyword).push("p.name = ").push_bind(package.clone());
    }
}

/// Locks the user row for the rest of the transaction.
async fn lock_user(
    db_tx: &mut sqlx::Transaction<'_, Postgres>,
    user_id: UserId,
) -> Result<(), RepoError> {
    let locked: Option<i64> = sqlx::query_scalar(r#"SELECT id FROM users WHERE id = $1 FOR UPDATE"#)
        .bind(user_id.get())
        .fetch_optional(&mut **db_tx)
        .await
        .map_err(db_error)?;

    locked.map(|_| ()).ok_or(RepoError::NotFound)
}

// ─────────────────────────────────────────────────────────────────────────────
// Users & sessions
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl UserRepository for PostgresRepo {
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let now = Utc::now();

        let result: Result<i64, sqlx::Error> = sqlx::query_scalar(
            r#"INSERT INTO users (username, email, password_hash, phone, created_at)
               VALUES ($1, $2, $3, $4, $5) RETURNING id"#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        let id = match result {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => {
                return Err(DomainError::UsernameTaken(user.username).into());
            }
            Err(e) => return Err(db_error(e)),
        };

        Ok(User {
            id: UserId::new(id),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            created_at: now,
        })
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let sql = format!("{SELECT_USER} WHERE id = $1");
        let row: Option<DbUser> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(DbUser::into_domain))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let sql = format!("{SELECT_USER} WHERE username = $1");
        let row: Option<DbUser> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(DbUser::into_domain))
    }

    async fn create_session(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> Result<Session, RepoError> {
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"INSERT INTO sessions (user_id, token_hash, created_at) VALUES ($1, $2, $3) RETURNING id"#,
        )
        .bind(user_id.get())
        .bind(token_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(Session {
            id: SessionId::new(id),
            user_id,
            token_hash: token_hash.to_string(),
            created_at: now,
        })
    }

    async fn find_session_user(&self, token_hash: &str) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(
            r#"SELECT u.id, u.username, u.email, u.password_hash, u.phone, u.created_at
               FROM sessions s JOIN users u ON u.id = s.user_id
               WHERE s.token_hash = $1"#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(DbUser::into_domain))
    }

    async fn delete_session(&self, token_hash: &str) -> Result<bool, RepoError> {
        let done = sqlx::query(r#"DELETE FROM sessions WHERE token_hash = $1"#)
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(done.rows_affected() > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CatalogRepository for PostgresRepo {
    async fn create_package(&self, req: CreatePackageRequest) -> Result<Package, RepoError> {
        let result: Result<i64, sqlx::Error> = sqlx::query_scalar(
            r#"INSERT INTO packages (name, price_per_hour) VALUES ($1, $2) RETURNING id"#,
        )
        .bind(&req.name)
        .bind(req.price_per_hour.amount())
        .fetch_one(&self.pool)
        .await;

        let id = match result {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => {
                return Err(RepoError::Conflict(format!(
                    "package {} already exists",
                    req.name
                )));
            }
            Err(e) => return Err(db_error(e)),
        };

        Ok(Package {
            id: PackageId::new(id),
            name: req.name,
            price_per_hour: req.price_per_hour,
        })
    }

    async fn find_package(&self, name: &str) -> Result<Option<Package>, RepoError> {
        let sql = format!("{SELECT_PACKAGE} WHERE name = $1");
        let row: Option<DbPackage> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(DbPackage::into_domain).transpose()
    }

    async fn list_packages(&self) -> Result<Vec<Package>, RepoError> {
        let sql = format!("{SELECT_PACKAGE} ORDER BY price_per_hour ASC, name ASC");
        let rows: Vec<DbPackage> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(DbPackage::into_domain).collect()
    }

    async fn create_car(&self, req: CreateCarRequest) -> Result<Car, RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_error)?;

        let package_id: Option<i64> =
            sqlx::query_scalar(r#"SELECT id FROM packages WHERE name = $1"#)
                .bind(&req.package)
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(db_error)?;

        let package_id =
            package_id.ok_or_else(|| DomainError::UnknownPackage(req.package.clone()))?;

        let result: Result<i64, sqlx::Error> = sqlx::query_scalar(
            r#"INSERT INTO cars (registration_number, brand, model, available, package_id)
               VALUES ($1, $2, $3, TRUE, $4) RETURNING id"#,
        )
        .bind(&req.registration_number)
        .bind(&req.brand)
        .bind(&req.model)
        .bind(package_id)
        .fetch_one(&mut *db_tx)
        .await;

        let id = match result {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => {
                return Err(RepoError::Conflict(format!(
                    "car {} already exists",
                    req.registration_number
                )));
            }
            Err(e) => return Err(db_error(e)),
        };

        db_tx.commit().await.map_err(tx_error)?;

        Ok(Car {
            id: CarId::new(id),
            registration_number: req.registration_number,
            brand: req.brand,
            model: req.model,
            available: true,
            package: req.package,
        })
    }

    async fn get_car(&self, id: CarId) -> Result<Option<Car>, RepoError> {
        let sql = format!("{SELECT_CAR} WHERE c.id = $1");
        let row: Option<DbCar> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(DbCar::into_domain))
    }

    async fn list_cars(&self, query: &CarQuery) -> Result<Page<Car>, RepoError> {
        let mut count = QueryBuilder::<Postgres>::new(COUNT_CARS);
        push_car_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_CAR);
        push_car_filters(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(car_sort_column(query.sort))
            .push(" ")
            .push(sort_keyword(query.direction))
            .push(", c.id ASC LIMIT ")
            .push_bind(i64::from(query.size))
            .push(" OFFSET ")
            .push_bind(query.offset());

        let rows: Vec<DbCar> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(Page {
            items: rows.into_iter().map(DbCar::into_domain).collect(),
            page: query.page,
            size: query.size,
            total,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Credit cards
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentRepository for PostgresRepo {
    async fn attach_card(
        &self,
        user_id: UserId,
        req: AttachCardRequest,
    ) -> Result<CreditCard, RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_error)?;

        lock_user(&mut db_tx, user_id).await?;

        let existing: Option<i64> =
            sqlx::query_scalar(r#"SELECT id FROM credit_cards WHERE user_id = $1"#)
                .bind(user_id.get())
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(db_error)?;

        if existing.is_some() {
            return Err(DomainError::CardAlreadyAttached.into());
        }

        let now = Utc::now();
        let result: Result<i64, sqlx::Error> = sqlx::query_scalar(
            r#"INSERT INTO credit_cards (user_id, number, expiry_month, expiry_year, cvv, balance, created_at)
               VALUES ($1, $2, $3, $4, $5, 0, $6) RETURNING id"#,
        )
        .bind(user_id.get())
        .bind(&req.number)
        .bind(req.expiry_month)
        .bind(req.expiry_year)
        .bind(&req.cvv)
        .bind(now)
        .fetch_one(&mut *db_tx)
        .await;

        let id = match result {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => return Err(DomainError::DuplicateCard.into()),
            Err(e) => return Err(db_error(e)),
        };

        db_tx.commit().await.map_err(tx_error)?;

        Ok(CreditCard {
            id: CreditCardId::new(id),
            user_id,
            number: req.number,
            expiry_month: req.expiry_month,
            expiry_year: req.expiry_year,
            cvv: req.cvv,
            balance: Money::zero(),
            created_at: now,
        })
    }

    async fn get_card(&self, user_id: UserId) -> Result<Option<CreditCard>, RepoError> {
        let sql = format!("{SELECT_CARD} WHERE user_id = $1");
        let row: Option<DbCreditCard> = sqlx::query_as(&sql)
            .bind(user_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(DbCreditCard::into_domain).transpose()
    }

    async fn add_funds(&self, user_id: UserId, amount: Money) -> Result<CreditCard, RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_error)?;

        // Lock the card with FOR UPDATE
        let sql = format!("{SELECT_CARD} WHERE user_id = $1 FOR UPDATE");
        let row: Option<DbCreditCard> = sqlx::query_as(&sql)
            .bind(user_id.get())
            .fetch_optional(&mut *db_tx)
            .await
            .map_err(db_error)?;

        let mut card = row.ok_or(DomainError::NoCreditCard)?.into_domain()?;
        card.credit(amount)?;

        sqlx::query(r#"UPDATE credit_cards SET balance = $1 WHERE id = $2"#)
            .bind(card.balance.amount())
            .bind(card.id.get())
            .execute(&mut *db_tx)
            .await
            .map_err(db_error)?;

        db_tx.commit().await.map_err(tx_error)?;

        Ok(card)
    }

    async fn remove_card(&self, user_id: UserId) -> Result<bool, RepoError> {
        let done = sqlx::query(r#"DELETE FROM credit_cards WHERE user_id = $1"#)
            .bind(user_id.get())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(done.rows_affected() > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders & pickups (MUST be atomic)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RentalRepository for PostgresRepo {
    async fn submit_order(
        &self,
        user_id: UserId,
        req: &SubmitOrderRequest,
    ) -> Result<Reservation, RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_error)?;

        lock_user(&mut db_tx, user_id).await?;

        let existing: Option<i64> =
            sqlx::query_scalar(r#"SELECT id FROM reservations WHERE user_id = $1"#)
                .bind(user_id.get())
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(db_error)?;

        if existing.is_some() {
            return Err(DomainError::ExistingReservation.into());
        }

        let sql = format!("{SELECT_PACKAGE} WHERE name = $1");
        let package: Option<DbPackage> = sqlx::query_as(&sql)
            .bind(&req.package)
            .fetch_optional(&mut *db_tx)
            .await
            .map_err(db_error)?;

        let package = package
            .ok_or_else(|| DomainError::UnknownPackage(req.package.clone()))?
            .into_domain()?;

        let sql = format!("{SELECT_CARD} WHERE user_id = $1 FOR UPDATE");
        let card: Option<DbCreditCard> = sqlx::query_as(&sql)
            .bind(user_id.get())
            .fetch_optional(&mut *db_tx)
            .await
            .map_err(db_error)?;

        let mut card = card.ok_or(DomainError::NoCreditCard)?.into_domain()?;

        let cost = package.cost_for(req.hours)?;
        card.debit(cost)?;

        sqlx::query(r#"UPDATE credit_cards SET balance = $1 WHERE id = $2"#)
            .bind(card.balance.amount())
            .bind(card.id.get())
            .execute(&mut *db_tx)
            .await
            .map_err(db_error)?;

        let now = Utc::now();
        let result: Result<i64, sqlx::Error> = sqlx::query_scalar(
            r#"INSERT INTO reservations (user_id, package, hours, created_at)
               VALUES ($1, $2, $3, $4) RETURNING id"#,
        )
        .bind(user_id.get())
        .bind(&package.name)
        .bind(req.hours)
        .bind(now)
        .fetch_one(&mut *db_tx)
        .await;

        let id = result.map_err(reservation_insert_error)?;

        db_tx.commit().await.map_err(tx_error)?;

        Ok(Reservation {
            id: ReservationId::new(id),
            user_id,
            package: package.name,
            hours: req.hours,
            created_at: now,
        })
    }

    async fn get_reservation(&self, user_id: UserId) -> Result<Option<Reservation>, RepoError> {
        let sql = format!("{SELECT_RESERVATION} WHERE user_id = $1");
        let row: Option<DbReservation> = sqlx::query_as(&sql)
            .bind(user_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(DbReservation::into_domain))
    }

    async fn pick_up(&self, user_id: UserId, car_id: CarId) -> Result<Pickup, RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_error)?;

        lock_user(&mut db_tx, user_id).await?;

        let sql = format!("{SELECT_RESERVATION} WHERE user_id = $1");
        let reservation: Option<DbReservation> = sqlx::query_as(&sql)
            .bind(user_id.get())
            .fetch_optional(&mut *db_tx)
            .await
            .map_err(db_error)?;

        let reservation = reservation
            .ok_or(DomainError::NoReservation)?
            .into_domain();

        // Lock the car with FOR UPDATE
        let sql = format!("{SELECT_CAR} WHERE c.id = $1 FOR UPDATE OF c");
        let car: Option<DbCar> = sqlx::query_as(&sql)
            .bind(car_id.get())
            .fetch_optional(&mut *db_tx)
            .await
            .map_err(db_error)?;

        let mut car = car.ok_or(DomainError::CarNotFound(car_id))?.into_domain();

        reservation.authorize_pickup(&car)?;

        let flipped =
            sqlx::query(r#"UPDATE cars SET available = FALSE WHERE id = $1 AND available"#)
                .bind(car_id.get())
                .execute(&mut *db_tx)
                .await
                .map_err(db_error)?;

        if flipped.rows_affected() == 0 {
            return Err(DomainError::CarUnavailable(car_id).into());
        }

        let rental = reservation.begin_rental(&car, Utc::now());

        let rental_id: i64 = sqlx::query_scalar(
            r#"INSERT INTO rentals (user_id, car_id, brand, model, started_at, ends_at)
               VALUES ($1, $2, $3, $4, $5, $6) RETURNING id"#,
        )
        .bind(rental.user_id.get())
        .bind(rental.car_id.get())
        .bind(&rental.brand)
        .bind(&rental.model)
        .bind(rental.started_at)
        .bind(rental.ends_at)
        .fetch_one(&mut *db_tx)
        .await
        .map_err(db_error)?;

        let rental = rental.with_id(RentalId::new(rental_id));

        let consumed = sqlx::query(r#"DELETE FROM reservations WHERE id = $1"#)
            .bind(reservation.id.get())
            .execute(&mut *db_tx)
            .await
            .map_err(db_error)?;

        if consumed.rows_affected() == 0 {
            return Err(DomainError::NoReservation.into());
        }

        db_tx.commit().await.map_err(tx_error)?;

        car.available = false;
        Ok(Pickup { car, rental })
    }

    async fn list_rentals(&self, user_id: UserId) -> Result<Vec<RentalRecord>, RepoError> {
        let sql = format!("{SELECT_RENTAL} WHERE user_id = $1 ORDER BY id DESC");
        let rows: Vec<DbRental> = sqlx::query_as(&sql)
            .bind(user_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(DbRental::into_domain).collect())
    }
}
