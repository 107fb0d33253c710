//! Error handling and edge case tests.

use typed_subscription::{
    Subscription, SubscriptionBuilder, SubscriptionConfig, SubscriptionError, Topic, TopicKey,
};

// --- Topic Errors ---

#[test]
fn test_empty_topic_rejected() {
    let result = Topic::<u8>::new("");
    assert!(matches!(result, Err(SubscriptionError::EmptyTopic)));
}

#[test]
fn test_malformed_topic_paths_rejected() {
    for path in ["orders.", ".orders", "orders..new", "orders new"] {
        let result = TopicKey::parse(path);
        match result {
            Err(SubscriptionError::InvalidTopic { topic, .. }) => assert_eq!(topic, path),
            other => panic!("expected InvalidTopic for {:?}, got {:?}", path, other),
        }
    }
}

#[test]
fn test_invalid_subtopic_segment() {
    let topic = Topic::<u8>::new("orders").unwrap();
    assert!(topic.subtopic("").is_err());
    assert!(topic.subtopic("new.").is_err());
    assert_eq!(
        topic.subtopic("new.express").unwrap().as_str(),
        "orders.new.express"
    );
}

#[test]
fn test_error_messages_name_the_topic() {
    let err = TopicKey::parse("a..b").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid topic 'a..b': contains an empty segment"
    );
}

// --- Config Errors ---

#[test]
fn test_malformed_config_json() {
    let result = SubscriptionConfig::from_json("{ not json");
    assert!(matches!(result, Err(SubscriptionError::InvalidConfig(_))));
}

#[test]
fn test_config_wrong_field_type() {
    let result = SubscriptionConfig::from_json(r#"{ "reject_subtopics": "yes" }"#);
    assert!(matches!(result, Err(SubscriptionError::InvalidConfig(_))));
}

// --- Delivery Edge Cases ---

#[test]
fn test_unrelated_topic_not_delivered() {
    let subscription = Subscription::new_subscription(Topic::<u8>::new("orders").unwrap())
        .build(|_| panic!("handler must not run"));

    let other = TopicKey::parse("ordersarchive").unwrap();
    assert!(!subscription.accepts_topic(&other));
    assert!(!subscription.deliver(&other, 1));
}

#[test]
fn test_parent_topic_not_delivered_to_child_subscription() {
    let subscription = Subscription::new_subscription(Topic::<u8>::new("orders.new").unwrap())
        .build(|_| panic!("handler must not run"));

    assert!(!subscription.deliver(&TopicKey::parse("orders").unwrap(), 1));
}

#[test]
fn test_filtered_content_is_silently_dropped() {
    let subscription = Subscription::new_subscription(Topic::<u8>::new("orders").unwrap())
        .filter_message(|_| false)
        .build(|_| panic!("handler must not run"));

    // Topic accepted even though content is dropped downstream.
    assert!(subscription.deliver(subscription.topic().key(), 1));
}

#[test]
fn test_config_unknown_field_rejected() {
    let result = SubscriptionConfig::from_json(r#"{ "rejectSubtopics": true }"#);
    assert!(matches!(result, Err(SubscriptionError::InvalidConfig(_))));
}
