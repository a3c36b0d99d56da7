//! Tests for the loyalty ledger service.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockBalanceRepository, MockOrderRepository};
use crate::domain::{ErrorCode, OrderStatus, Points};

type TestService = LoyaltyService<MockOrderRepository, MockBalanceRepository>;

fn make_service(orders: MockOrderRepository, balances: MockBalanceRepository) -> TestService {
    LoyaltyService::new(Arc::new(orders), Arc::new(balances))
}

#[fixture]
fn number() -> OrderNumber {
    OrderNumber::new("79927398713").expect("valid order number")
}

#[rstest]
#[tokio::test]
async fn submit_order_passes_intake_through(number: OrderNumber) {
    let user_id = UserId::random();
    let mut orders = MockOrderRepository::new();
    let expected_number = number.clone();
    orders
        .expect_create_order()
        .withf(move |n, _| *n == expected_number)
        .times(1)
        .return_once(|_, _| Ok(OrderIntake::AlreadyOwned));

    let service = make_service(orders, MockBalanceRepository::new());
    let intake = service
        .submit_order(&user_id, &number)
        .await
        .expect("intake succeeds");
    assert_eq!(intake, OrderIntake::AlreadyOwned);
}

#[rstest]
#[case::conflict(OrderRepositoryError::conflict("79927398713"), ErrorCode::Conflict)]
#[case::connection(OrderRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case::query(OrderRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn submit_order_maps_repository_errors(
    number: OrderNumber,
    #[case] failure: OrderRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut orders = MockOrderRepository::new();
    orders
        .expect_create_order()
        .times(1)
        .return_once(move |_, _| Err(failure));

    let service = make_service(orders, MockBalanceRepository::new());
    let error = service
        .submit_order(&UserId::random(), &number)
        .await
        .expect_err("mapped error");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[case::zero(Points::ZERO)]
#[case::negative(Points::from_hundredths(-1))]
#[tokio::test]
async fn withdraw_rejects_non_positive_amounts(number: OrderNumber, #[case] amount: Points) {
    let mut balances = MockBalanceRepository::new();
    balances.expect_withdraw().times(0);

    let service = make_service(MockOrderRepository::new(), balances);
    let error = service
        .withdraw(WithdrawalRequest {
            user_id: UserId::random(),
            order: number,
            amount,
        })
        .await
        .expect_err("non-positive sum");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn withdraw_reports_insufficient_funds_with_details(number: OrderNumber) {
    let mut balances = MockBalanceRepository::new();
    balances.expect_withdraw().times(1).return_once(|_| {
        Err(BalanceRepositoryError::InsufficientFunds {
            current: Points::from_whole(500),
            requested: Points::from_whole(600),
        })
    });

    let service = make_service(MockOrderRepository::new(), balances);
    let error = service
        .withdraw(WithdrawalRequest {
            user_id: UserId::random(),
            order: number,
            amount: Points::from_whole(600),
        })
        .await
        .expect_err("insufficient funds");
    assert_eq!(error.code(), ErrorCode::InsufficientFunds);
    assert_eq!(
        error.details(),
        Some(&json!({ "current": 500.0, "requested": 600.0 }))
    );
}

#[rstest]
#[tokio::test]
async fn withdraw_maps_duplicate_to_conflict(number: OrderNumber) {
    let duplicate = number.clone();
    let mut balances = MockBalanceRepository::new();
    balances
        .expect_withdraw()
        .times(1)
        .return_once(move |_| Err(BalanceRepositoryError::already_exists(duplicate)));

    let service = make_service(MockOrderRepository::new(), balances);
    let error = service
        .withdraw(WithdrawalRequest {
            user_id: UserId::random(),
            order: number,
            amount: Points::from_whole(1),
        })
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn withdraw_returns_committed_row(number: OrderNumber) {
    let user_id = UserId::random();
    let processed_at = Utc
        .with_ymd_and_hms(2026, 2, 26, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    let committed = Withdrawal {
        order: number.clone(),
        user_id,
        amount: Points::from_whole(100),
        processed_at,
    };
    let returned = committed.clone();
    let mut balances = MockBalanceRepository::new();
    balances
        .expect_withdraw()
        .withf(move |request| request.amount == Points::from_whole(100))
        .times(1)
        .return_once(move |_| Ok(returned));

    let service = make_service(MockOrderRepository::new(), balances);
    let withdrawal = service
        .withdraw(WithdrawalRequest {
            user_id,
            order: number,
            amount: Points::from_whole(100),
        })
        .await
        .expect("withdrawal commits");
    assert_eq!(withdrawal, committed);
}

#[rstest]
#[tokio::test]
async fn queries_delegate_to_repositories(number: OrderNumber) {
    let user_id = UserId::random();
    let uploaded_at = Utc
        .with_ymd_and_hms(2026, 2, 26, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    let order = Order {
        number,
        user_id,
        status: OrderStatus::Processed,
        accrual: Some(Points::from_whole(500)),
        uploaded_at,
    };
    let listed = vec![order.clone()];
    let mut orders = MockOrderRepository::new();
    orders
        .expect_list_for_user()
        .times(1)
        .return_once(move |_| Ok(listed));
    let mut balances = MockBalanceRepository::new();
    balances.expect_balance().times(1).return_once(|_| {
        Ok(Balance {
            current: Points::from_whole(500),
            withdrawn: Points::ZERO,
        })
    });
    balances
        .expect_list_withdrawals()
        .times(1)
        .return_once(|_| Ok(Vec::new()));

    let service = make_service(orders, balances);
    assert_eq!(service.orders(&user_id).await.expect("orders"), vec![order]);
    assert_eq!(
        service.balance(&user_id).await.expect("balance").current,
        Points::from_whole(500)
    );
    assert!(service.withdrawals(&user_id).await.expect("withdrawals").is_empty());
}

#[rstest]
#[tokio::test]
async fn balance_maps_connection_failures_to_unavailable() {
    let mut balances = MockBalanceRepository::new();
    balances
        .expect_balance()
        .times(1)
        .return_once(|_| Err(BalanceRepositoryError::connection("pool timeout")));

    let service = make_service(MockOrderRepository::new(), balances);
    let error = service
        .balance(&UserId::random())
        .await
        .expect_err("unavailable");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
