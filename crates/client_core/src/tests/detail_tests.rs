use super::*;
use crate::test_support::{sample_item, settle, within, FakeListingService};
use shared::error::{INVALID_ID_MESSAGE, SERVER_FAILURE_MESSAGE};

async fn settled(controller: &ItemDetailController) -> DetailState {
    let mut rx = controller.observe();
    let state = within(rx.wait_for(|state| !matches!(state, DetailState::Loading)))
        .await
        .expect("controller alive")
        .clone();
    state
}

#[tokio::test]
async fn loads_item_by_numeric_id() {
    let service = Arc::new(FakeListingService::with_items(5));
    let controller = ItemDetailController::new(service.clone());
    assert_eq!(controller.state(), DetailState::Loading);

    controller.load("3");
    assert_eq!(settled(&controller).await, DetailState::Success(sample_item(3)));
    assert_eq!(service.item_calls(), vec![ItemId(3)]);
}

#[tokio::test]
async fn rejects_non_numeric_id_without_fetching() {
    let service = Arc::new(FakeListingService::with_items(5));
    let controller = ItemDetailController::new(service.clone());

    controller.load("abc");
    assert_eq!(
        controller.state(),
        DetailState::Error {
            message: INVALID_ID_MESSAGE.to_string()
        }
    );
    assert!(service.item_calls().is_empty());
}

#[tokio::test]
async fn rejects_padded_and_out_of_range_ids() {
    let service = Arc::new(FakeListingService::with_items(5));
    let controller = ItemDetailController::new(service.clone());

    for raw in [" 3 ", "3\n", "4294967296", "-2147483649"] {
        controller.load(raw);
        assert_eq!(
            controller.state(),
            DetailState::Error {
                message: INVALID_ID_MESSAGE.to_string()
            },
            "{raw:?}"
        );
    }
    assert!(service.item_calls().is_empty());

    controller.load("-2147483648");
    settle().await;
    assert_eq!(service.item_calls(), vec![ItemId(-2147483648)]);
}

#[tokio::test]
async fn missing_item_surfaces_server_error() {
    let service = Arc::new(FakeListingService::with_items(5));
    let controller = ItemDetailController::new(service);

    controller.load("404");
    assert_eq!(
        settled(&controller).await,
        DetailState::Error {
            message: SERVER_FAILURE_MESSAGE.to_string()
        }
    );
}

#[tokio::test]
async fn latest_load_wins() {
    let service = Arc::new(FakeListingService::with_items(5));
    let controller = ItemDetailController::new(service);

    controller.load("1");
    controller.load("2");
    settle().await;

    assert_eq!(controller.state(), DetailState::Success(sample_item(2)));
}
