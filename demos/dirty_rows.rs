// Example: the dirty-state evaluation against a generation snapshot.
use rowflip::{JournalEntry, Record, Snapshot, is_dirty};

const PERIOD: u32 = 1;
const THRESHOLD: usize = 2;

fn entry(tags: &[&str], note: &str) -> JournalEntry {
    JournalEntry {
        tags: tags.iter().map(|t| t.to_string()).collect(),
        note: note.into(),
    }
}

fn report(label: &str, record: &Record) {
    println!("{label}: dirty = {}", is_dirty(record, PERIOD, THRESHOLD));
}

fn main() {
    let mut r = Record::new(1);
    r.given_name = "Ada".into();
    r.family_name = "Lovelace".into();
    r.tags = vec!["motivated".into()];
    r.grades.insert(PERIOD, 1.7);
    r.context.insert(PERIOD, "strong start to the term".into());
    r.journal = vec![
        entry(&["math"], "finished the proofs early"),
        entry(&["math"], "helped a classmate with derivatives"),
        entry(&["absent"], "missed one lesson"),
    ];
    r.generated.insert(PERIOD, "Ada is doing great.".into());
    r.snapshot = Some(Snapshot::capture(&r, PERIOD, THRESHOLD));

    report("freshly generated", &r);

    // "absent" appears once and stays below the threshold; editing its note
    // cannot invalidate the generated text.
    r.journal[2].note = "missed one lesson (excused)".into();
    report("sub-threshold note edited", &r);

    // "math" is active; its notes feed the digest.
    r.journal[0].note = "rewrote the proofs from scratch".into();
    report("active note edited", &r);

    // A grade change always invalidates.
    r.journal[0].note = "finished the proofs early".into();
    r.grades.insert(PERIOD, 1.0);
    report("grade changed", &r);
}
