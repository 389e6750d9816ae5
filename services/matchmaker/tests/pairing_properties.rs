//! Pairing properties under concurrent joins

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use matchmaker::engine::Assignment;
use matchmaker::{MatchConfig, Matchmaker, MemorySink, PeerLink};
use proptest::prelude::*;
use tokio::sync::mpsc;
use types::ids::{PeerId, RoomId};
use types::peer::JoinRequest;

/// Join every identity at once and collect the assignments.
fn pair_all(ids: Vec<String>) -> Vec<(PeerId, Assignment)> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async move {
        let (matchmaker, _dispatcher) =
            Matchmaker::start(MatchConfig::default(), Arc::new(MemorySink::new()));

        let mut writers = Vec::new();
        let mut joins = Vec::new();
        for id in ids {
            let peer = PeerId::try_new(id).unwrap();
            let (tx, rx) = mpsc::channel(8);
            writers.push(rx);
            let engine = matchmaker.engine().clone();
            joins.push(tokio::spawn(async move {
                let request = JoinRequest {
                    id: peer.clone(),
                    rating: 0,
                    formation: None,
                };
                let assignment = engine.join(request, PeerLink::new(peer.clone(), tx)).await;
                (peer, assignment)
            }));
        }

        let mut assignments = Vec::new();
        for join in joins {
            let (peer, assignment) = join.await.unwrap();
            assignments.push((peer, assignment.unwrap()));
        }
        drop(writers);
        assignments
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn no_identity_is_matched_twice(ids in prop::collection::hash_set("[a-z]{1,6}", 2..16)) {
        let mut ids: Vec<String> = ids.into_iter().collect();
        // An odd peer out would wait forever.
        if ids.len() % 2 == 1 {
            ids.pop();
        }
        let expected = ids.len();

        let assignments = pair_all(ids);
        prop_assert_eq!(assignments.len(), expected);

        let mut rooms: HashMap<RoomId, Vec<&Assignment>> = HashMap::new();
        let mut seen = HashSet::new();
        for (peer, assignment) in &assignments {
            prop_assert!(seen.insert(peer.clone()));
            prop_assert_eq!(&assignment.seat.id, peer);
            rooms.entry(assignment.room).or_default().push(assignment);
        }

        prop_assert_eq!(rooms.len(), expected / 2);
        for seats in rooms.values() {
            prop_assert_eq!(seats.len(), 2);
            prop_assert_ne!(&seats[0].seat.id, &seats[1].seat.id);
            prop_assert_eq!(seats[0].seat.side.opposite(), seats[1].seat.side);
        }
    }
}
