use kantui::io::database::SqliteGateway;
use kantui::model::{Status, Ticket, TicketId};
use kantui::ops::rank::RANK_GAP;
use kantui::ops::ticket_store::TicketStore;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn open(dir: &TempDir) -> TicketStore<SqliteGateway> {
    let mut gateway = SqliteGateway::open(&dir.path().join("kantui.db")).unwrap();
    gateway.migrate(0).unwrap();
    let mut store = TicketStore::new(gateway);
    store.load().unwrap();
    store
}

fn summary(tickets: &[Ticket]) -> Vec<(i64, Status, String)> {
    tickets
        .iter()
        .map(|t| (t.id.number(), t.status, t.title.clone()))
        .collect()
}

#[test]
fn mutations_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let before = {
        let mut store = open(&dir);
        let a = store.create("A", "").unwrap();
        let b = store.create("B", "details").unwrap();
        let c = store.create("C", "").unwrap();
        assert!(store.rank_before(c, a).unwrap());
        assert!(store.move_to_next_status(b).unwrap());
        store.update_content(a, "A2", "now described").unwrap();
        store.tickets().to_vec()
    };

    let store = open(&dir);
    assert_eq!(store.tickets(), before.as_slice());
    assert_eq!(
        summary(store.tickets()),
        vec![
            (3, Status::Todo, "C".to_string()),
            (1, Status::Todo, "A2".to_string()),
            (2, Status::InProgress, "B".to_string()),
        ]
    );
    assert_eq!(store.tickets()[1].description, "now described");
}

#[test]
fn ranks_are_strictly_increasing_after_moves() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    let ids: Vec<TicketId> = (0..6)
        .map(|i| store.create(&format!("T{i}"), "").unwrap())
        .collect();
    assert!(store.rank_after(ids[0], ids[5]).unwrap());
    assert!(store.rank_before(ids[4], ids[1]).unwrap());
    assert!(store.rank_before(ids[3], ids[4]).unwrap());
    store.delete(ids[2]).unwrap();

    let reopened = open(&dir);
    assert_eq!(reopened.tickets(), store.tickets());
    let ranks: Vec<i64> = reopened.tickets().iter().map(|t| t.rank).collect();
    assert!(ranks.windows(2).all(|w| w[0] < w[1]), "{ranks:?}");
    let order: Vec<i64> = reopened.tickets().iter().map(|t| t.id.number()).collect();
    assert_eq!(order, vec![4, 5, 2, 6, 1]);
}

#[test]
fn new_tickets_rank_one_gap_past_the_maximum() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    store.create("first", "").unwrap();
    store.create("second", "").unwrap();
    let ranks: Vec<i64> = store.tickets().iter().map(|t| t.rank).collect();
    assert_eq!(ranks, vec![RANK_GAP, 2 * RANK_GAP]);
}
