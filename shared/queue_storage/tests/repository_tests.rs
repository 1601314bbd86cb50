//! Provider adapter tests against the in-memory provider

mod common;

use std::time::Duration;

use aws_sdk_sqs::types::{Message, MessageSystemAttributeName, QueueAttributeName};
use pretty_assertions::assert_eq;
use queue_storage::queue::mock::{MockSqsApi, RecordedCall, MOCK_QUEUE_URL_PREFIX};
use queue_storage::queue::{
    AttributeMap, CallContext, Encryption, MessageAttribute, ProviderCall, QueueError, QueueType,
    SendMessageRequest,
};
use tokio_util::sync::CancellationToken;

use crate::common::{binary_attribute, mock_repository, provider_message, string_attribute};

const ORDERS: &str = "http://localhost:4566/000000000000/orders";
const EVENTS: &str = "http://localhost:4566/000000000000/events.fifo";
const ARCHIVE: &str = "http://localhost:4566/000000000000/archive";

#[tokio::test]
async fn test_list_queues_paginates_and_sorts_by_name() {
    let (repository, mock) = mock_repository(
        MockSqsApi::new()
            .with_queue_pages(&[&[ORDERS, EVENTS], &[ARCHIVE]])
            .with_queue_attributes(
                ORDERS,
                &[
                    ("CreatedTimestamp", "1700000000"),
                    ("ApproximateNumberOfMessages", "5"),
                    ("ApproximateNumberOfMessagesNotVisible", "1"),
                    ("KmsMasterKeyId", "alias/aws/sqs"),
                ],
            )
            .with_queue_attributes(EVENTS, &[("ContentBasedDeduplication", "true")]),
    );

    let queues = repository
        .list_queues(&CallContext::new())
        .await
        .expect("listing should succeed");

    let names: Vec<_> = queues.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(names, vec!["archive", "events.fifo", "orders"]);

    let events = &queues[1];
    assert_eq!(events.queue_type, QueueType::Fifo);
    assert!(events.content_based_deduplication);

    let orders = &queues[2];
    assert_eq!(orders.queue_type, QueueType::Standard);
    assert_eq!(orders.messages_available, 5);
    assert_eq!(orders.messages_in_flight, 1);
    assert_eq!(orders.encryption, Encryption::Kms);
    assert!(orders.created_at.is_some());

    let list_calls = mock.calls_to(ProviderCall::ListQueues);
    assert_eq!(
        list_calls,
        vec![
            RecordedCall::ListQueues { next_token: None },
            RecordedCall::ListQueues {
                next_token: Some("page-1".to_string())
            },
        ]
    );
}

#[tokio::test]
async fn test_list_queues_requests_fifo_attributes_only_for_fifo_urls() {
    let (repository, mock) =
        mock_repository(MockSqsApi::new().with_queue_pages(&[&[ORDERS, EVENTS]]));

    repository
        .list_queues(&CallContext::new())
        .await
        .expect("listing should succeed");

    for call in mock.calls_to(ProviderCall::GetQueueAttributes) {
        let RecordedCall::GetQueueAttributes {
            queue_url,
            attribute_names,
        } = call
        else {
            unreachable!("filtered by call kind");
        };

        let wants_fifo = attribute_names.contains(&QueueAttributeName::FifoQueue);
        assert_eq!(wants_fifo, queue_url == EVENTS, "unexpected names for {queue_url}");
        assert!(attribute_names.contains(&QueueAttributeName::CreatedTimestamp));
        assert!(attribute_names.contains(&QueueAttributeName::KmsMasterKeyId));
    }
}

#[tokio::test]
async fn test_list_queues_skips_queue_with_failing_attributes() {
    let (repository, _mock) = mock_repository(
        MockSqsApi::new()
            .with_queue_pages(&[&[ORDERS, ARCHIVE]])
            .with_failing_attributes(ARCHIVE),
    );

    let queues = repository
        .list_queues(&CallContext::new())
        .await
        .expect("partial failure must not fail the listing");

    assert_eq!(queues.len(), 1);
    assert_eq!(queues[0].url, ORDERS);
}

#[tokio::test]
async fn test_list_queues_fails_when_listing_fails() {
    let (repository, _mock) = mock_repository(
        MockSqsApi::new().failing(ProviderCall::ListQueues, "AccessDenied"),
    );

    let err = repository
        .list_queues(&CallContext::new())
        .await
        .expect_err("listing should fail");

    assert_eq!(err.to_string(), "failed to call ListQueues API: AccessDenied");
}

#[tokio::test]
async fn test_create_queue_returns_provider_url() {
    let (repository, mock) = mock_repository(MockSqsApi::new());
    let attributes: AttributeMap = [("FifoQueue".to_string(), "true".to_string())].into();

    let queue_url = repository
        .create_queue(&CallContext::new(), "orders.fifo", &attributes)
        .await
        .expect("create should succeed");

    assert_eq!(queue_url, format!("{MOCK_QUEUE_URL_PREFIX}/orders.fifo"));
    assert_eq!(
        mock.calls(),
        vec![RecordedCall::CreateQueue {
            queue_name: "orders.fifo".to_string(),
            attributes,
        }]
    );
}

#[tokio::test]
async fn test_create_queue_without_url_is_a_contract_violation() {
    let (repository, _mock) = mock_repository(MockSqsApi::new().without_created_queue_url());

    let err = repository
        .create_queue(&CallContext::new(), "orders", &AttributeMap::new())
        .await
        .expect_err("missing URL should fail");

    assert!(matches!(err, QueueError::MissingQueueUrl));
}

#[tokio::test]
async fn test_get_queue_detail_with_tags() {
    let (repository, mock) = mock_repository(
        MockSqsApi::new()
            .with_queue_attributes(
                EVENTS,
                &[
                    ("QueueArn", "arn:aws:sqs:us-east-1:000000000000:events.fifo"),
                    ("FifoQueue", "true"),
                    ("LastModifiedTimestamp", "1700000100"),
                    ("VisibilityTimeout", "30"),
                ],
            )
            .with_tags(EVENTS, &[("team", "payments")]),
    );

    let detail = repository
        .get_queue_detail(&CallContext::new(), EVENTS)
        .await
        .expect("detail should succeed");

    assert_eq!(detail.summary.name, "events.fifo");
    assert_eq!(detail.summary.queue_type, QueueType::Fifo);
    assert_eq!(detail.arn, "arn:aws:sqs:us-east-1:000000000000:events.fifo");
    assert!(detail.last_modified_at.is_some());
    assert_eq!(detail.attributes.get("VisibilityTimeout").map(String::as_str), Some("30"));
    assert_eq!(
        detail.tags,
        Some([("team".to_string(), "payments".to_string())].into())
    );

    let RecordedCall::GetQueueAttributes {
        attribute_names, ..
    } = &mock.calls()[0]
    else {
        panic!("first call should fetch attributes");
    };
    assert_eq!(attribute_names, &vec![QueueAttributeName::All]);
}

#[tokio::test]
async fn test_get_queue_detail_survives_tag_failure() {
    let (repository, _mock) = mock_repository(
        MockSqsApi::new()
            .with_queue_attributes(ORDERS, &[("ApproximateNumberOfMessages", "4")])
            .failing(ProviderCall::ListQueueTags, "AccessDenied"),
    );

    let detail = repository
        .get_queue_detail(&CallContext::new(), ORDERS)
        .await
        .expect("tag failure must not fail the detail view");

    assert_eq!(detail.summary.messages_available, 4);
    assert_eq!(detail.tags, None);
}

#[tokio::test]
async fn test_get_queue_detail_fails_when_attributes_fail() {
    let (repository, mock) = mock_repository(
        MockSqsApi::new().failing(ProviderCall::GetQueueAttributes, "QueueDoesNotExist"),
    );

    let err = repository
        .get_queue_detail(&CallContext::new(), ORDERS)
        .await
        .expect_err("attribute failure should fail the detail view");

    assert_eq!(
        err.to_string(),
        "failed to call GetQueueAttributes API: QueueDoesNotExist"
    );
    assert!(mock.calls_to(ProviderCall::ListQueueTags).is_empty());
}

#[tokio::test]
async fn test_delete_and_purge_wrap_errors() {
    let (repository, _mock) = mock_repository(
        MockSqsApi::new()
            .failing(ProviderCall::DeleteQueue, "QueueDoesNotExist")
            .failing_with_status(ProviderCall::PurgeQueue, "ServiceUnavailable", 503),
    );
    let ctx = CallContext::new();

    let delete = repository
        .delete_queue(&ctx, ORDERS)
        .await
        .expect_err("delete should fail");
    let purge = repository
        .purge_queue(&ctx, ORDERS)
        .await
        .expect_err("purge should fail");

    assert_eq!(delete.to_string(), "failed to call DeleteQueue API: QueueDoesNotExist");
    assert!(!delete.is_upstream_error());
    assert_eq!(purge.to_string(), "failed to call PurgeQueue API: ServiceUnavailable");
    assert!(purge.is_upstream_error());
}

#[tokio::test]
async fn test_send_message_trims_ids_and_drops_blank_attribute_names() {
    let (repository, mock) = mock_repository(MockSqsApi::new());

    let message_id = repository
        .send_message(
            &CallContext::new(),
            SendMessageRequest {
                queue_url: EVENTS.to_string(),
                body: "hello".to_string(),
                delay_seconds: Some(5),
                message_group_id: Some("  group-1 ".to_string()),
                message_deduplication_id: Some("   ".to_string()),
                attributes: [
                    ("trace".to_string(), "abc".to_string()),
                    ("  ".to_string(), "ignored".to_string()),
                ]
                .into(),
            },
        )
        .await
        .expect("send should succeed");

    assert_eq!(message_id.as_deref(), Some("mock-message-id"));
    assert_eq!(
        mock.calls(),
        vec![RecordedCall::SendMessage(SendMessageRequest {
            queue_url: EVENTS.to_string(),
            body: "hello".to_string(),
            delay_seconds: Some(5),
            message_group_id: Some("group-1".to_string()),
            message_deduplication_id: None,
            attributes: [("trace".to_string(), "abc".to_string())].into(),
        })]
    );
}

#[tokio::test]
async fn test_receive_messages_requests_peek_with_system_attributes() {
    let (repository, mock) = mock_repository(
        MockSqsApi::new().with_messages(vec![provider_message("m-1", "hi", "3")]),
    );

    let messages = repository
        .receive_messages(&CallContext::new(), ORDERS, 10, 20)
        .await
        .expect("receive should succeed");

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].receive_count, 3);
    assert_eq!(messages[0].receipt_handle, "rh-m-1");

    let RecordedCall::ReceiveMessage(request) = &mock.calls()[0] else {
        panic!("expected a receive call");
    };
    assert_eq!(request.max_messages, 10);
    assert_eq!(request.wait_time_seconds, 20);
    assert_eq!(request.visibility_timeout, 0);
    assert_eq!(request.message_attribute_names, vec!["All".to_string()]);
    for name in [
        MessageSystemAttributeName::ApproximateReceiveCount,
        MessageSystemAttributeName::SentTimestamp,
        MessageSystemAttributeName::ApproximateFirstReceiveTimestamp,
        MessageSystemAttributeName::MessageGroupId,
        MessageSystemAttributeName::MessageDeduplicationId,
        MessageSystemAttributeName::SequenceNumber,
    ] {
        assert!(request.system_attribute_names.contains(&name), "missing {name:?}");
    }
}

#[tokio::test]
async fn test_receive_messages_decodes_binary_attributes() {
    let message = Message::builder()
        .message_id("m-1")
        .body("payload")
        .receipt_handle("rh")
        .message_attributes("blob", binary_attribute(&[0x01, 0x02]))
        .message_attributes("kind", string_attribute("order"))
        .attributes(MessageSystemAttributeName::MessageGroupId, "group-1")
        .build();
    let (repository, _mock) = mock_repository(MockSqsApi::new().with_messages(vec![message]));

    let messages = repository
        .receive_messages(&CallContext::new(), EVENTS, 1, 0)
        .await
        .expect("receive should succeed");

    assert_eq!(
        messages[0].attributes,
        vec![
            MessageAttribute::new("blob", "AQI="),
            MessageAttribute::new("kind", "order"),
            MessageAttribute::new("MessageGroupId", "group-1"),
        ]
    );
}

#[tokio::test]
async fn test_delete_message_surfaces_stale_handle_failure() {
    let (repository, mock) = mock_repository(
        MockSqsApi::new().failing(ProviderCall::DeleteMessage, "ReceiptHandleIsInvalid"),
    );

    let err = repository
        .delete_message(&CallContext::new(), ORDERS, "stale")
        .await
        .expect_err("stale handle should fail");

    assert_eq!(
        err.to_string(),
        "failed to call DeleteMessage API: ReceiptHandleIsInvalid"
    );
    assert_eq!(
        mock.calls(),
        vec![RecordedCall::DeleteMessage {
            queue_url: ORDERS.to_string(),
            receipt_handle: "stale".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_cancelled_listing_is_not_swallowed() {
    let token = CancellationToken::new();
    let (repository, _mock) = mock_repository(
        MockSqsApi::new()
            .with_queue_pages(&[&[ORDERS]])
            .with_delay(Duration::from_secs(30)),
    );
    let ctx = CallContext::with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let err = repository
        .list_queues(&ctx)
        .await
        .expect_err("listing should be cancelled");

    canceller.await.expect("canceller task panicked");
    assert!(matches!(err, QueueError::Cancelled));
}

#[tokio::test]
async fn test_deadline_applies_to_receive() {
    let (repository, _mock) =
        mock_repository(MockSqsApi::new().with_delay(Duration::from_secs(30)));
    let ctx = CallContext::new().with_timeout(Duration::from_millis(20));

    let err = repository
        .receive_messages(&ctx, ORDERS, 10, 20)
        .await
        .expect_err("receive should time out");

    assert!(matches!(err, QueueError::DeadlineExceeded));
}
