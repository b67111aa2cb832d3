//! Request lifecycle.
//!
//! Open: the row exists and the item reads "Progress". Responded: the
//! receiver has written `res_message` and/or moved the item status. Closed:
//! the row is gone and the item reads "Available" again. Every transition
//! that touches both the request and its item runs in one transaction with
//! both rows locked.

use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::{
    dto::{CreateRequest, RequestUpdate, RespondRequest},
    repo,
    repo_types::Request,
};
use crate::{
    error::{AppError, AppResult},
    items::{self, Item, STATUS_AVAILABLE, STATUS_IN_PROGRESS},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Sender,
    Receiver,
}

pub fn party_of(request: &Request, user_id: i64) -> Result<Party, AppError> {
    if request.id_sent == user_id {
        Ok(Party::Sender)
    } else if request.id_receive == user_id {
        Ok(Party::Receiver)
    } else {
        Err(AppError::forbidden("Not authorized to access this request"))
    }
}

/// Guards request creation against self-requests and items already in an exchange.
pub fn check_can_request(item: &Item, requester: i64) -> Result<(), AppError> {
    if item.id_user == requester {
        return Err(AppError::invalid("You cannot request your own item"));
    }
    if item.status != STATUS_AVAILABLE {
        return Err(AppError::invalid("Item is not available"));
    }
    Ok(())
}

/// Applies a message edit; each side may only write its own field.
pub fn apply_update(
    request: &mut Request,
    actor: i64,
    update: RequestUpdate,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    let party = party_of(request, actor)?;
    if update.message.is_some() && party != Party::Sender {
        return Err(AppError::forbidden("Only the sender can update the message"));
    }
    if update.res_message.is_some() && party != Party::Receiver {
        return Err(AppError::forbidden("Only the receiver can update the response message"));
    }

    if let Some(message) = update.message {
        request.message = Some(message);
    }
    if let Some(res_message) = update.res_message {
        request.res_message = Some(res_message);
    }
    request.update_time = now;
    Ok(())
}

/// Applies the receiver's response to the request; returns the item status to write, if any.
pub fn apply_response(
    request: &mut Request,
    actor: i64,
    response: RespondRequest,
    now: OffsetDateTime,
) -> Result<Option<String>, AppError> {
    if party_of(request, actor)? != Party::Receiver {
        return Err(AppError::forbidden("Only the receiver can respond to this request"));
    }
    if let Some(res_message) = response.res_message {
        request.res_message = Some(res_message);
    }
    request.update_time = now;
    Ok(response.item_status)
}

/// Status an item is put back to when its request is closed. Unconditional,
/// even when the receiver already moved the item to a terminal label.
pub fn status_after_close(_item: &Item) -> &'static str {
    STATUS_AVAILABLE
}

fn request_not_found() -> AppError {
    AppError::not_found("Request not found")
}

fn item_not_found() -> AppError {
    AppError::not_found("Item not found")
}

pub async fn create_request(db: &PgPool, requester: i64, input: CreateRequest) -> AppResult<Request> {
    let mut tx = db.begin().await?;

    let item = items::repo::lock_tx(&mut tx, input.id_item)
        .await?
        .ok_or_else(item_not_found)?;
    check_can_request(&item, requester).map_err(|e| {
        warn!(item_id = item.id_item, requester, error = %e, "request rejected");
        e
    })?;

    items::repo::set_status_tx(&mut tx, item.id_item, STATUS_IN_PROGRESS).await?;
    let request = repo::insert_tx(
        &mut tx,
        requester,
        item.id_user,
        item.id_item,
        input.message.as_deref(),
    )
    .await?;
    tx.commit().await?;

    info!(
        request_id = request.id,
        item_id = item.id_item,
        sender = requester,
        receiver = item.id_user,
        "request opened"
    );
    Ok(request)
}

pub async fn update_request(db: &PgPool, actor: i64, request_id: i64, update: RequestUpdate) -> AppResult<Request> {
    let mut tx = db.begin().await?;
    let mut request = repo::lock_tx(&mut tx, request_id)
        .await?
        .ok_or_else(request_not_found)?;

    apply_update(&mut request, actor, update, OffsetDateTime::now_utc())?;
    let request = repo::save_tx(&mut tx, &request).await?;
    tx.commit().await?;

    info!(request_id, actor, "request messages updated");
    Ok(request)
}

pub async fn respond_request(
    db: &PgPool,
    actor: i64,
    request_id: i64,
    response: RespondRequest,
) -> AppResult<Request> {
    let mut tx = db.begin().await?;
    let mut request = repo::lock_tx(&mut tx, request_id)
        .await?
        .ok_or_else(request_not_found)?;

    let item_status = apply_response(&mut request, actor, response, OffsetDateTime::now_utc())?;
    let item = items::repo::lock_tx(&mut tx, request.id_item)
        .await?
        .ok_or_else(item_not_found)?;

    if let Some(status) = item_status.as_deref() {
        items::repo::set_status_tx(&mut tx, item.id_item, status).await?;
    }
    let request = repo::save_tx(&mut tx, &request).await?;
    tx.commit().await?;

    info!(request_id, item_id = item.id_item, item_status = ?item_status, "request responded");
    Ok(request)
}

pub async fn delete_request(db: &PgPool, actor: i64, request_id: i64) -> AppResult<()> {
    let mut tx = db.begin().await?;
    let request = repo::lock_tx(&mut tx, request_id)
        .await?
        .ok_or_else(request_not_found)?;
    party_of(&request, actor)?;

    let item = items::repo::lock_tx(&mut tx, request.id_item)
        .await?
        .ok_or_else(item_not_found)?;
    let reverted = status_after_close(&item);
    items::repo::set_status_tx(&mut tx, item.id_item, reverted).await?;
    repo::delete_tx(&mut tx, request.id).await?;
    tx.commit().await?;

    info!(request_id, item_id = item.id_item, from = %item.status, to = reverted, "request closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: i64 = 1;
    const BUYER: i64 = 2;
    const STRANGER: i64 = 3;

    fn open_request() -> Request {
        Request::sample(10, BUYER, OWNER, 100)
    }

    #[test]
    fn owner_can_never_request_own_item() {
        for status in ["Available", "Progress", "Sold", ""] {
            let item = Item::sample(100, OWNER, status);
            assert!(matches!(
                check_can_request(&item, OWNER),
                Err(AppError::InvalidOperation(_))
            ));
        }
    }

    #[test]
    fn non_owner_may_request_available_item() {
        let item = Item::sample(100, OWNER, STATUS_AVAILABLE);
        assert!(check_can_request(&item, BUYER).is_ok());
    }

    #[test]
    fn second_requester_sees_item_in_progress() {
        // what a concurrent requester observes after acquiring the row lock
        let item = Item::sample(100, OWNER, STATUS_IN_PROGRESS);
        assert!(matches!(
            check_can_request(&item, STRANGER),
            Err(AppError::InvalidOperation(_))
        ));
    }

    #[test]
    fn party_resolution() {
        let req = open_request();
        assert_eq!(party_of(&req, BUYER).unwrap(), Party::Sender);
        assert_eq!(party_of(&req, OWNER).unwrap(), Party::Receiver);
        assert!(matches!(party_of(&req, STRANGER), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn sender_updates_message_and_refreshes_time() {
        let mut req = open_request();
        let before = req.update_time;
        let now = OffsetDateTime::now_utc();
        apply_update(
            &mut req,
            BUYER,
            RequestUpdate {
                message: Some("still interested".into()),
                res_message: None,
            },
            now,
        )
        .unwrap();
        assert_eq!(req.message.as_deref(), Some("still interested"));
        assert_eq!(req.update_time, now);
        assert!(req.update_time > before);
    }

    #[test]
    fn cross_role_writes_are_forbidden() {
        let now = OffsetDateTime::now_utc();

        let mut req = open_request();
        let err = apply_update(
            &mut req,
            OWNER,
            RequestUpdate {
                message: Some("hijack".into()),
                res_message: None,
            },
            now,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(req.message.as_deref(), Some("interested"));

        let err = apply_update(
            &mut req,
            BUYER,
            RequestUpdate {
                message: None,
                res_message: Some("self-answer".into()),
            },
            now,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(req.res_message.is_none());
    }

    #[test]
    fn mixed_update_is_all_or_nothing() {
        let mut req = open_request();
        let before = req.clone();
        let res = apply_update(
            &mut req,
            BUYER,
            RequestUpdate {
                message: Some("new".into()),
                res_message: Some("not mine".into()),
            },
            OffsetDateTime::now_utc(),
        );
        assert!(res.is_err());
        assert_eq!(req.message, before.message);
        assert_eq!(req.update_time, before.update_time);
    }

    #[test]
    fn strangers_cannot_update() {
        let mut req = open_request();
        let res = apply_update(&mut req, STRANGER, RequestUpdate::default(), OffsetDateTime::now_utc());
        assert!(matches!(res, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn receiver_responds_with_message_and_status() {
        let mut req = open_request();
        let status = apply_response(
            &mut req,
            OWNER,
            RespondRequest {
                res_message: Some("deal".into()),
                item_status: Some("Sold".into()),
            },
            OffsetDateTime::now_utc(),
        )
        .unwrap();
        assert_eq!(status.as_deref(), Some("Sold"));
        assert_eq!(req.res_message.as_deref(), Some("deal"));
    }

    #[test]
    fn only_receiver_may_respond() {
        let mut req = open_request();
        for actor in [BUYER, STRANGER] {
            let res = apply_response(
                &mut req,
                actor,
                RespondRequest::default(),
                OffsetDateTime::now_utc(),
            );
            assert!(matches!(res, Err(AppError::Forbidden(_))));
        }
    }

    #[test]
    fn closing_reverts_to_available_from_any_status() {
        // create then delete round-trips an available item
        let item = Item::sample(100, OWNER, STATUS_IN_PROGRESS);
        assert_eq!(status_after_close(&item), STATUS_AVAILABLE);
        // a sold item is reverted too
        let item = Item::sample(100, OWNER, "Sold");
        assert_eq!(status_after_close(&item), STATUS_AVAILABLE);
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;
    use crate::db::testing;

    fn ask(id_item: i64) -> CreateRequest {
        CreateRequest {
            id_item,
            message: Some("is it still available?".into()),
        }
    }

    #[tokio::test]
    async fn concurrent_requests_create_exactly_one() {
        let Some(db) = testing::pool().await else { return };
        let owner = testing::user(&db).await;
        let (first, second) = (testing::user(&db).await, testing::user(&db).await);
        let item = testing::item(&db, owner.id).await;

        let (a, b) = tokio::join!(
            create_request(&db, first.id, ask(item.id_item)),
            create_request(&db, second.id, ask(item.id_item)),
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1, "a={a:?} b={b:?}");
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(AppError::InvalidOperation(_))));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests WHERE id_item = $1")
            .bind(item.id_item)
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(testing::item_status(&db, item.id_item).await.as_deref(), Some(STATUS_IN_PROGRESS));
    }

    #[tokio::test]
    async fn own_item_cannot_be_requested() {
        let Some(db) = testing::pool().await else { return };
        let owner = testing::user(&db).await;
        let item = testing::item(&db, owner.id).await;

        let res = create_request(&db, owner.id, ask(item.id_item)).await;
        assert!(matches!(res, Err(AppError::InvalidOperation(_))));
        assert_eq!(testing::item_status(&db, item.id_item).await.as_deref(), Some(STATUS_AVAILABLE));
    }

    #[tokio::test]
    async fn create_respond_delete_round_trip() {
        let Some(db) = testing::pool().await else { return };
        let owner = testing::user(&db).await;
        let buyer = testing::user(&db).await;
        let item = testing::item(&db, owner.id).await;

        let request = create_request(&db, buyer.id, ask(item.id_item)).await.unwrap();
        assert_eq!(request.id_receive, owner.id);
        assert_eq!(testing::item_status(&db, item.id_item).await.as_deref(), Some(STATUS_IN_PROGRESS));

        let edited = update_request(
            &db,
            buyer.id,
            request.id,
            RequestUpdate {
                message: Some("offer 8".into()),
                res_message: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(edited.message.as_deref(), Some("offer 8"));

        let responded = respond_request(
            &db,
            owner.id,
            request.id,
            RespondRequest {
                res_message: Some("deal".into()),
                item_status: Some("Sold".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(responded.res_message.as_deref(), Some("deal"));
        assert_eq!(testing::item_status(&db, item.id_item).await.as_deref(), Some("Sold"));

        let err = delete_request(&db, testing::user(&db).await.id, request.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        delete_request(&db, buyer.id, request.id).await.unwrap();
        assert_eq!(testing::item_status(&db, item.id_item).await.as_deref(), Some(STATUS_AVAILABLE));
        assert!(repo::find_detail(&db, request.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn operations_on_a_deleted_item_are_not_found() {
        let Some(db) = testing::pool().await else { return };
        let owner = testing::user(&db).await;
        let buyer = testing::user(&db).await;
        let item = testing::item(&db, owner.id).await;
        let request = create_request(&db, buyer.id, ask(item.id_item)).await.unwrap();

        assert!(items::repo::delete_owned(&db, item.id_item, owner.id).await.unwrap());

        let res = respond_request(&db, owner.id, request.id, RespondRequest::default()).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
        let res = delete_request(&db, buyer.id, request.id).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));

        // the failed delete rolled back; the row is still there
        let detail = repo::find_detail(&db, request.id).await.unwrap().unwrap();
        assert!(detail.item_name.is_none());
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let Some(db) = testing::pool().await else { return };
        let user = testing::user(&db).await;
        let res = delete_request(&db, user.id, i64::MAX).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
    }
}
