use rust_decimal_macros::dec;
use wallet_engine::application::service::WalletService;
use wallet_engine::domain::operation::{Operation, OperationKind};
use wallet_engine::domain::wallet::WalletId;
use wallet_engine::error::WalletError;
use wallet_engine::infrastructure::in_memory::InMemoryWalletStore;

fn service() -> WalletService {
    WalletService::new(Box::new(InMemoryWalletStore::new()))
}

#[tokio::test]
async fn test_create_deposit_withdraw_roundtrip() {
    let service = service();
    let id = WalletId::new_v4();

    let created = service.create_wallet(id).await.unwrap();
    assert_eq!(created.wallet, id);
    assert_eq!(created.balance, dec!(0));

    let deposit = Operation::new(id, OperationKind::Deposit, dec!(1000.00)).unwrap();
    assert_eq!(
        service.process_operation(deposit).await.unwrap().balance,
        dec!(1000.00)
    );

    let withdraw = Operation::new(id, OperationKind::Withdraw, dec!(250.50)).unwrap();
    assert_eq!(
        service.process_operation(withdraw).await.unwrap().balance,
        dec!(749.50)
    );
}

#[tokio::test]
async fn test_over_balance_withdraw_rejected() {
    let service = service();
    let id = WalletId::new_v4();
    service.create_wallet(id).await.unwrap();

    let deposit = Operation::new(id, OperationKind::Deposit, dec!(1000.00)).unwrap();
    service.process_operation(deposit).await.unwrap();

    let withdraw = Operation::new(id, OperationKind::Withdraw, dec!(9999.00)).unwrap();
    let result = service.process_operation(withdraw).await;
    assert!(matches!(
        result,
        Err(WalletError::InsufficientFunds {
            wallet,
            balance,
            requested,
        }) if wallet == id && balance == dec!(1000.00) && requested == dec!(9999.00)
    ));

    assert_eq!(service.get_balance(id).await.unwrap().balance, dec!(1000.00));
}

#[tokio::test]
async fn test_operation_against_unknown_wallet() {
    let service = service();

    let op = Operation::new(WalletId::new_v4(), OperationKind::Deposit, dec!(10.00)).unwrap();
    assert!(matches!(
        service.process_operation(op).await,
        Err(WalletError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_balance_of_unknown_wallet() {
    let service = service();
    assert!(matches!(
        service.get_balance(WalletId::new_v4()).await,
        Err(WalletError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_second_creation_rejected() {
    let service = service();
    let id = WalletId::new_v4();

    service.create_wallet(id).await.unwrap();
    let deposit = Operation::new(id, OperationKind::Deposit, dec!(42.00)).unwrap();
    service.process_operation(deposit).await.unwrap();

    assert!(matches!(
        service.create_wallet(id).await,
        Err(WalletError::AlreadyExists(got)) if got == id
    ));
    // The failed attempt must not reset the balance
    assert_eq!(service.get_balance(id).await.unwrap().balance, dec!(42.00));
}

#[tokio::test]
async fn test_repeated_reads_agree() {
    let service = service();
    let id = WalletId::new_v4();
    service.create_wallet(id).await.unwrap();
    let deposit = Operation::new(id, OperationKind::Deposit, dec!(7.77)).unwrap();
    service.process_operation(deposit).await.unwrap();

    let first = service.get_balance(id).await.unwrap();
    let second = service.get_balance(id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_invalid_amount_rejected_before_storage() {
    let id = WalletId::new_v4();
    assert!(matches!(
        Operation::new(id, OperationKind::Deposit, dec!(0.00)),
        Err(WalletError::InvalidAmount(_))
    ));
    assert!(matches!(
        Operation::new(id, OperationKind::Withdraw, dec!(-3.00)),
        Err(WalletError::InvalidAmount(_))
    ));
    assert!(matches!(
        Operation::new(id, OperationKind::Deposit, dec!(1.005)),
        Err(WalletError::InvalidAmount(_))
    ));
}
