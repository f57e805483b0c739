// Example: a set change (remove + add + reorder) driven against a console
// view tree, with the host loop pumping `tick` and `on_frame` by hand.
use rowflip::{
    Reconciler, ReconcilerOptions, Record, Rect, RowBadge, RowContent, RowPatch, ViewTree,
};

const ROW_HEIGHT: f64 = 24.0;

/// A toy view tree that prints every mutation and lays rows out vertically.
#[derive(Default)]
struct ConsoleTree {
    order: Vec<u64>,
    labels: Vec<(u64, String)>,
}

impl ConsoleTree {
    fn insert(&mut self, key: u64, before: Option<&u64>) {
        let at = before
            .and_then(|b| self.order.iter().position(|k| k == b))
            .unwrap_or(self.order.len());
        self.order.insert(at, key);
    }
}

impl ViewTree<u64> for ConsoleTree {
    fn mount(&mut self, key: &u64, content: &RowContent, before: Option<&u64>) {
        println!("  mount    {key} ({})", content.identity);
        self.insert(*key, before);
        self.labels.push((*key, content.identity.clone()));
    }

    fn mount_placeholder(&mut self, key: &u64, message: &str, before: Option<&u64>) {
        println!("  mount placeholder {key}: {message}");
        self.insert(*key, before);
    }

    fn move_before(&mut self, key: &u64, before: Option<&u64>) {
        println!("  move     {key} before {before:?}");
        self.order.retain(|k| k != key);
        self.insert(*key, before);
    }

    fn remove(&mut self, key: &u64) {
        println!("  remove   {key}");
        self.order.retain(|k| k != key);
        self.labels.retain(|(k, _)| k != key);
    }

    fn apply(&mut self, key: &u64, patch: &RowPatch) {
        println!("  patch    {key} (indicator only: {})", patch.is_indicator_only());
    }

    fn set_exiting(&mut self, key: &u64) {
        println!("  exiting  {key}");
    }

    fn clear_exiting(&mut self, key: &u64) {
        println!("  unexit   {key}");
    }

    fn set_entering(&mut self, key: &u64, delay_ms: u64) {
        println!("  entering {key} (delay {delay_ms}ms)");
    }

    fn clear_entering(&mut self, key: &u64) {
        println!("  settled  {key}");
    }

    fn set_offset(&mut self, key: &u64, dy: f64) {
        println!("  invert   {key} (dy {dy:+})");
    }

    fn play(&mut self, key: &u64, duration_ms: u64) {
        println!("  play     {key} ({duration_ms}ms)");
    }

    fn clear_motion(&mut self, key: &u64) {
        println!("  still    {key}");
    }

    fn set_badge(&mut self, _key: &u64, _badge: Option<RowBadge>) {}
    fn set_selected(&mut self, _key: &u64, _selected: bool) {}

    fn measure(&self, key: &u64) -> Option<Rect> {
        let index = self.order.iter().position(|k| k == key)?;
        Some(Rect {
            top: index as f64 * ROW_HEIGHT,
            left: 0.0,
            width: 320.0,
            height: ROW_HEIGHT,
        })
    }

    fn flush_layout(&mut self) {}

    fn clear(&mut self) {
        self.order.clear();
        self.labels.clear();
    }
}

fn record(key: u64, given: &str, family: &str) -> Record {
    let mut r = Record::new(key);
    r.given_name = given.into();
    r.family_name = family.into();
    r
}

fn pump(engine: &mut Reconciler, tree: &mut ConsoleTree, now_ms: &mut u64) {
    loop {
        if engine.needs_frame() {
            *now_ms += 16;
            println!("[frame @{now_ms}]");
            engine.on_frame(tree, *now_ms);
            continue;
        }
        match engine.next_deadline() {
            Some(at) => {
                *now_ms = at;
                println!("[tick  @{now_ms}]");
                engine.tick(tree, *now_ms);
            }
            None => return,
        }
    }
}

fn main() {
    let mut engine = Reconciler::new(ReconcilerOptions::new(1));
    let mut tree = ConsoleTree::default();
    let mut now_ms = 0u64;

    println!("initial build:");
    let outcome = engine.reconcile(
        &[
            record(1, "Ada", "Lovelace"),
            record(2, "Alan", "Turing"),
            record(3, "Grace", "Hopper"),
        ],
        &mut tree,
        now_ms,
    );
    println!("rebuilt = {}\n", outcome.rebuilt);

    println!("set change: drop Turing, add Hamilton, Hopper first:");
    now_ms += 1000;
    engine.reconcile(
        &[
            record(3, "Grace", "Hopper"),
            record(1, "Ada", "Lovelace"),
            record(4, "Margaret", "Hamilton"),
        ],
        &mut tree,
        now_ms,
    );
    pump(&mut engine, &mut tree, &mut now_ms);

    println!("\nfinal order: {:?}", engine.visible_keys());
}
