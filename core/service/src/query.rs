// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Filtered streaming over the record store.

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::Status;
use tracing::{Instrument, debug};

use crate::api::{CustomerFilter, CustomerRecord};
use crate::store::RecordStore;

/// Records buffered ahead of a slow reader.
const STREAM_BUFFER: usize = 128;

/// Stream of records sent back to a caller.
pub type CustomerStream = ReceiverStream<Result<CustomerRecord, Status>>;

impl CustomerFilter {
    /// Case-sensitive substring match on the record name. An empty keyword
    /// matches every record.
    pub fn matches(&self, record: &CustomerRecord) -> bool {
        record.name.contains(self.keyword.as_str())
    }
}

/// Stream every stored record matching `filter`, in insertion order.
///
/// The candidate set is captured before this returns. Records are produced
/// by a background task that stops as soon as the receiver goes away.
pub fn stream_customers(store: &RecordStore, filter: CustomerFilter) -> CustomerStream {
    let keyword = filter.keyword.clone();
    let snapshot = store.scan(move |record| filter.matches(record));
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);

    tokio::spawn(async move {
        let mut sent = 0usize;
        for record in snapshot.iter() {
            if tx.send(Ok(record.clone())).await.is_err() {
                debug!(%keyword, sent, "receiver dropped: stopping customer stream");
                return;
            }
            sent += 1;
        }

        debug!(%keyword, sent, "customer stream completed");
    }
    .in_current_span());

    ReceiverStream::new(rx)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_stream::StreamExt;
    use tracing_test::traced_test;

    use super::*;
    use crate::api::Address;

    fn sample_store() -> RecordStore {
        let store = RecordStore::new();
        store.append(CustomerRecord {
            id: 103,
            name: "Shiju Varghese".to_string(),
            email: "shiju@xyz.com".to_string(),
            phone: "732-757-2923".to_string(),
            addresses: vec![
                Address {
                    street: "1 Mission Street".to_string(),
                    city: "San Francisco".to_string(),
                    state: "CA".to_string(),
                    zip: "94105".to_string(),
                    is_shipping_address: false,
                },
                Address {
                    street: "Greenfield".to_string(),
                    city: "Kochi".to_string(),
                    state: "KL".to_string(),
                    zip: "68356".to_string(),
                    is_shipping_address: true,
                },
            ],
        });
        store.append(CustomerRecord {
            id: 102,
            name: "Irene Rose".to_string(),
            email: "irene@xyz.com".to_string(),
            phone: "732-757-2924".to_string(),
            addresses: vec![Address {
                street: "1 Mission Street".to_string(),
                city: "San Francisco".to_string(),
                state: "CA".to_string(),
                zip: "94105".to_string(),
                is_shipping_address: true,
            }],
        });
        store
    }

    fn filter(keyword: &str) -> CustomerFilter {
        CustomerFilter {
            keyword: keyword.to_string(),
        }
    }

    async fn collect_names(store: &RecordStore, keyword: &str) -> Vec<String> {
        stream_customers(store, filter(keyword))
            .map(|r| r.unwrap().name)
            .collect()
            .await
    }

    #[test]
    fn test_matches() {
        let record = CustomerRecord {
            name: "Irene Rose".to_string(),
            ..Default::default()
        };

        assert!(filter("").matches(&record));
        assert!(filter("Rose").matches(&record));
        assert!(filter("e R").matches(&record));
        assert!(!filter("rose").matches(&record));
        assert!(!filter("Roses").matches(&record));
    }

    #[tokio::test]
    async fn test_stream_by_keyword() {
        let store = sample_store();

        assert_eq!(collect_names(&store, "Rose").await, vec!["Irene Rose"]);
        assert_eq!(
            collect_names(&store, "").await,
            vec!["Shiju Varghese", "Irene Rose"]
        );
        assert!(collect_names(&store, "xyz").await.is_empty());
    }

    #[tokio::test]
    async fn test_streamed_records_are_complete() {
        let store = sample_store();
        let records: Vec<CustomerRecord> = stream_customers(&store, filter("Shiju"))
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 103);
        assert_eq!(records[0].addresses.len(), 2);
        assert!(records[0].addresses[1].is_shipping_address);
    }

    #[tokio::test]
    async fn test_stream_ignores_records_appended_after_start() {
        let store = sample_store();
        let stream = stream_customers(&store, filter(""));

        store.append(CustomerRecord {
            id: 1,
            name: "Late Comer".to_string(),
            ..Default::default()
        });

        let names: Vec<String> = stream.map(|r| r.unwrap().name).collect().await;
        assert_eq!(names, vec!["Shiju Varghese", "Irene Rose"]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_dropped_receiver_stops_the_producer() {
        let store = RecordStore::new();
        for id in 0..(STREAM_BUFFER as i32 * 4) {
            store.append(CustomerRecord {
                id,
                name: format!("customer {id}"),
                ..Default::default()
            });
        }

        let mut stream = stream_customers(&store, filter("customer"));
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.id, 0);
        drop(stream);

        // the store is still usable and the producer does not block it
        store.append(CustomerRecord::default());
        assert_eq!(store.len(), STREAM_BUFFER * 4 + 1);

        let stopped = tokio::time::timeout(Duration::from_secs(5), async {
            while !logs_contain("receiver dropped") {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(stopped.is_ok());
        assert!(!logs_contain("customer stream completed"));
    }
}
