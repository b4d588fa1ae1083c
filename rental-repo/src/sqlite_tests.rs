//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use rental_types::{
        AttachCardRequest, CarId, CarQuery, CarSort, CatalogRepository, CreateCarRequest,
        CreatePackageRequest, DomainError, Money, NewUser, PaymentRepository, RentalRepository,
        RepoError, SortDirection, SubmitOrderRequest, User, UserId, UserRepository,
    };

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();

        for (name, price) in [("Ordinary", 1_000), ("Premium", 2_500)] {
            repo.create_package(CreatePackageRequest {
                name: name.to_string(),
                price_per_hour: Money::new(price).unwrap(),
            })
            .await
            .unwrap();
        }

        for (reg, brand, model, package) in [
            ("WX 1001", "Toyota", "Corolla", "Ordinary"),
            ("WX 1002", "Skoda", "Octavia", "Ordinary"),
            ("WX 2001", "BMW", "X5", "Premium"),
        ] {
            repo.create_car(CreateCarRequest {
                registration_number: reg.to_string(),
                brand: brand.to_string(),
                model: model.to_string(),
                package: package.to_string(),
            })
            .await
            .unwrap();
        }

        repo
    }

    async fn user(repo: &SqliteRepo, username: &str) -> User {
        repo.create_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "salt$hash".to_string(),
            phone: "123456789".to_string(),
        })
        .await
        .unwrap()
    }

    fn card(number: &str) -> AttachCardRequest {
        AttachCardRequest {
            number: number.to_string(),
            expiry_month: 12,
            expiry_year: 2030,
            cvv: "123".to_string(),
        }
    }

    fn order(package: &str, hours: i32) -> SubmitOrderRequest {
        SubmitOrderRequest {
            package: package.to_string(),
            hours,
        }
    }

    async fn funded_user(repo: &SqliteRepo, username: &str, number: &str, funds: i64) -> UserId {
        let user = user(repo, username).await;
        repo.attach_card(user.id, card(number)).await.unwrap();
        repo.add_funds(user.id, Money::new(funds).unwrap())
            .await
            .unwrap();
        user.id
    }

    async fn balance(repo: &SqliteRepo, user_id: UserId) -> i64 {
        repo.get_card(user_id)
            .await
            .unwrap()
            .unwrap()
            .balance
            .amount()
    }

    async fn car_by_reg(repo: &SqliteRepo, reg: &str) -> CarId {
        repo.list_cars(&CarQuery::default())
            .await
            .unwrap()
            .items
            .into_iter()
            .find(|c| c.registration_number == reg)
            .unwrap()
            .id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_duplicate_username() {
        let repo = setup_repo().await;
        user(&repo, "alice").await;

        let result = repo
            .create_user(NewUser {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                password_hash: "x$y".to_string(),
                phone: "1".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::UsernameTaken(_)))
        ));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let repo = setup_repo().await;
        let alice = user(&repo, "alice").await;

        repo.create_session(alice.id, "hash-1").await.unwrap();

        let found = repo.find_session_user("hash-1").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);

        assert!(repo.delete_session("hash-1").await.unwrap());
        assert!(!repo.delete_session("hash-1").await.unwrap());
        assert!(repo.find_session_user("hash-1").await.unwrap().is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_list_packages_ordered_by_price() {
        let repo = setup_repo().await;

        let packages = repo.list_packages().await.unwrap();

        let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Ordinary", "Premium"]);
        assert_eq!(packages[1].price_per_hour.amount(), 2_500);
    }

    #[tokio::test]
    async fn test_create_car_unknown_package() {
        let repo = setup_repo().await;

        let result = repo
            .create_car(CreateCarRequest {
                registration_number: "WX 9999".to_string(),
                brand: "Fiat".to_string(),
                model: "Panda".to_string(),
                package: "Luxury".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::UnknownPackage(_)))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_registration_number() {
        let repo = setup_repo().await;

        let result = repo
            .create_car(CreateCarRequest {
                registration_number: "WX 1001".to_string(),
                brand: "Fiat".to_string(),
                model: "Panda".to_string(),
                package: "Ordinary".to_string(),
            })
            .await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_cars_paged_and_sorted() {
        let repo = setup_repo().await;

        let page = repo
            .list_cars(&CarQuery {
                page: 0,
                size: 2,
                sort: CarSort::Brand,
                direction: SortDirection::Desc,
                ..CarQuery::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        let brands: Vec<_> = page.items.iter().map(|c| c.brand.as_str()).collect();
        assert_eq!(brands, ["Toyota", "Skoda"]);

        let last = repo
            .list_cars(&CarQuery {
                page: 1,
                size: 2,
                sort: CarSort::Brand,
                direction: SortDirection::Desc,
                ..CarQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].brand, "BMW");
    }

    #[tokio::test]
    async fn test_list_cars_filtered() {
        let repo = setup_repo().await;

        let premium = repo
            .list_cars(&CarQuery {
                package: Some("Premium".to_string()),
                ..CarQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(premium.total, 1);
        assert_eq!(premium.items[0].model, "X5");

        let unavailable = repo
            .list_cars(&CarQuery {
                available: Some(false),
                ..CarQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(unavailable.total, 0);
        assert!(unavailable.items.is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Credit cards
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_attach_card_starts_empty() {
        let repo = setup_repo().await;
        let alice = user(&repo, "alice").await;

        let attached = repo
            .attach_card(alice.id, card("4111111111111111"))
            .await
            .unwrap();

        assert_eq!(attached.balance, Money::zero());
        assert_eq!(balance(&repo, alice.id).await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_card_number() {
        let repo = setup_repo().await;
        let alice = user(&repo, "alice").await;
        let bob = user(&repo, "bob").await;
        repo.attach_card(alice.id, card("4111111111111111"))
            .await
            .unwrap();

        let result = repo.attach_card(bob.id, card("4111111111111111")).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::DuplicateCard))
        ));
        assert!(repo.get_card(bob.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_card_for_same_user() {
        let repo = setup_repo().await;
        let alice = user(&repo, "alice").await;
        repo.attach_card(alice.id, card("4111111111111111"))
            .await
            .unwrap();

        let result = repo.attach_card(alice.id, card("5500000000000004")).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::CardAlreadyAttached))
        ));
    }

    #[tokio::test]
    async fn test_add_funds_without_card() {
        let repo = setup_repo().await;
        let alice = user(&repo, "alice").await;

        let result = repo.add_funds(alice.id, Money::new(500).unwrap()).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::NoCreditCard))
        ));
    }

    #[tokio::test]
    async fn test_remove_card() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 1_000).await;

        assert!(repo.remove_card(alice).await.unwrap());
        assert!(!repo.remove_card(alice).await.unwrap());
        assert!(repo.get_card(alice).await.unwrap().is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_submit_order_debits_card() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 100_000).await;

        let reservation = repo.submit_order(alice, &order("Ordinary", 10)).await.unwrap();

        assert_eq!(reservation.package, "Ordinary");
        assert_eq!(reservation.hours, 10);
        assert_eq!(balance(&repo, alice).await, 90_000);

        let stored = repo.get_reservation(alice).await.unwrap().unwrap();
        assert_eq!(stored.id, reservation.id);
    }

    #[tokio::test]
    async fn test_second_order_rejected_without_charge() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 100_000).await;
        repo.submit_order(alice, &order("Ordinary", 10)).await.unwrap();

        let result = repo.submit_order(alice, &order("Premium", 1)).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::ExistingReservation))
        ));
        assert_eq!(balance(&repo, alice).await, 90_000);
    }

    #[tokio::test]
    async fn test_insufficient_funds_rolls_back() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 5_000).await;

        let result = repo.submit_order(alice, &order("Ordinary", 10)).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::InsufficientFunds {
                available: 5_000,
                requested: 10_000,
            }))
        ));
        assert_eq!(balance(&repo, alice).await, 5_000);
        assert!(repo.get_reservation(alice).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_order_exact_balance() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 10_000).await;

        repo.submit_order(alice, &order("Ordinary", 10)).await.unwrap();

        assert_eq!(balance(&repo, alice).await, 0);
    }

    #[tokio::test]
    async fn test_order_unknown_package() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 10_000).await;

        let result = repo.submit_order(alice, &order("Luxury", 1)).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::UnknownPackage(name))) if name == "Luxury"
        ));
        assert_eq!(balance(&repo, alice).await, 10_000);
    }

    #[tokio::test]
    async fn test_order_without_card() {
        let repo = setup_repo().await;
        let alice = user(&repo, "alice").await;

        let result = repo.submit_order(alice.id, &order("Ordinary", 1)).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::NoCreditCard))
        ));
        assert!(repo.get_reservation(alice.id).await.unwrap().is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pickups
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_pick_up_consumes_reservation() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 100_000).await;
        repo.submit_order(alice, &order("Ordinary", 10)).await.unwrap();
        let car_id = car_by_reg(&repo, "WX 1001").await;

        let pickup = repo.pick_up(alice, car_id).await.unwrap();

        assert!(!pickup.car.available);
        assert_eq!(pickup.rental.car_id, car_id);
        assert_eq!(pickup.rental.brand, "Toyota");
        assert_eq!(
            pickup.rental.ends_at - pickup.rental.started_at,
            chrono::Duration::hours(10)
        );

        assert!(repo.get_reservation(alice).await.unwrap().is_none());
        assert!(!repo.get_car(car_id).await.unwrap().unwrap().available);

        let rentals = repo.list_rentals(alice).await.unwrap();
        assert_eq!(rentals.len(), 1);
        assert_eq!(rentals[0].id, pickup.rental.id);
    }

    #[tokio::test]
    async fn test_pick_up_without_reservation() {
        let repo = setup_repo().await;
        let alice = user(&repo, "alice").await;
        let car_id = car_by_reg(&repo, "WX 1001").await;

        let result = repo.pick_up(alice.id, car_id).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::NoReservation))
        ));
        assert!(repo.get_car(car_id).await.unwrap().unwrap().available);
    }

    #[tokio::test]
    async fn test_pick_up_unknown_car() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 100_000).await;
        repo.submit_order(alice, &order("Ordinary", 1)).await.unwrap();

        let result = repo.pick_up(alice, CarId::new(999)).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::CarNotFound(id))) if id == CarId::new(999)
        ));
        assert!(repo.get_reservation(alice).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_package_mismatch_leaves_state_untouched() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 100_000).await;
        repo.submit_order(alice, &order("Ordinary", 2)).await.unwrap();
        let premium_car = car_by_reg(&repo, "WX 2001").await;

        let result = repo.pick_up(alice, premium_car).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::PackageMismatch { .. }))
        ));
        assert!(repo.get_reservation(alice).await.unwrap().is_some());
        assert!(repo.get_car(premium_car).await.unwrap().unwrap().available);
        assert!(repo.list_rentals(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_car_taken_by_someone_else() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 100_000).await;
        let bob = funded_user(&repo, "bob", "5500000000000004", 100_000).await;
        repo.submit_order(alice, &order("Ordinary", 1)).await.unwrap();
        repo.submit_order(bob, &order("Ordinary", 1)).await.unwrap();
        let car_id = car_by_reg(&repo, "WX 1001").await;
        repo.pick_up(alice, car_id).await.unwrap();

        let result = repo.pick_up(bob, car_id).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::CarUnavailable(_)))
        ));
        assert!(repo.get_reservation(bob).await.unwrap().is_some());
        assert!(repo.list_rentals(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_pickups_of_one_car() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 100_000).await;
        let bob = funded_user(&repo, "bob", "5500000000000004", 100_000).await;
        repo.submit_order(alice, &order("Ordinary", 1)).await.unwrap();
        repo.submit_order(bob, &order("Ordinary", 1)).await.unwrap();
        let car_id = car_by_reg(&repo, "WX 1002").await;

        let (a, b) = tokio::join!(repo.pick_up(alice, car_id), repo.pick_up(bob, car_id));

        let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(
            loser,
            Err(RepoError::Domain(DomainError::CarUnavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_orders_of_one_user() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 100_000).await;
        let req = order("Ordinary", 1);

        let (a, b) = tokio::join!(repo.submit_order(alice, &req), repo.submit_order(alice, &req));

        let placed = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(placed, 1);
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(
            loser,
            Err(RepoError::Domain(DomainError::ExistingReservation))
        ));
        assert_eq!(balance(&repo, alice).await, 99_000);
    }

    #[tokio::test]
    async fn test_reservation_constraint_maps_to_existing_reservation() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 100_000).await;
        repo.submit_order(alice, &order("Ordinary", 1)).await.unwrap();

        let err = sqlx::query(
            "INSERT INTO reservations (user_id, package, hours, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(alice.get())
        .bind("Premium")
        .bind(2)
        .bind(chrono::Utc::now())
        .execute(repo.pool())
        .await
        .unwrap_err();

        assert!(matches!(
            crate::reservation_insert_error(err),
            RepoError::Domain(DomainError::ExistingReservation)
        ));

        let result = repo.submit_order(alice, &order("Premium", 2)).await;
        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::ExistingReservation))
        ));
        assert_eq!(balance(&repo, alice).await, 99_000);
    }

    #[tokio::test]
    async fn test_rentals_newest_first() {
        let repo = setup_repo().await;
        let alice = funded_user(&repo, "alice", "4111111111111111", 100_000).await;

        repo.submit_order(alice, &order("Ordinary", 1)).await.unwrap();
        let first = car_by_reg(&repo, "WX 1001").await;
        repo.pick_up(alice, first).await.unwrap();

        repo.submit_order(alice, &order("Ordinary", 1)).await.unwrap();
        let second = car_by_reg(&repo, "WX 1002").await;
        repo.pick_up(alice, second).await.unwrap();

        let rentals = repo.list_rentals(alice).await.unwrap();
        let cars: Vec<_> = rentals.iter().map(|r| r.car_id).collect();
        assert_eq!(cars, [second, first]);
        assert_eq!(balance(&repo, alice).await, 98_000);
    }
}
