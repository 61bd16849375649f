use chrono::{TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use instasolve::store::answers::AnswerStore;
use instasolve::store::schema::AnswerRecord;
use instasolve::typing::{ShadowBuffer, Typist, TypingProfile};

const SENTENCE: &str = "The quick brown fox jumps over the lazy dog.";

fn make_records(count: usize) -> Vec<AnswerRecord> {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| AnswerRecord {
            question: format!("question {i}"),
            translation: format!("translation {}", i % 97),
            answer: format!("answer {i}"),
            updated_at: at,
        })
        .collect()
}

fn bench_typist(c: &mut Criterion) {
    let profile = TypingProfile::new(40.0, 0.05);
    let paragraph = SENTENCE.repeat(20);

    c.bench_function("typist sentence (44 chars)", |b| {
        b.iter(|| {
            let rng = SmallRng::seed_from_u64(42);
            Typist::new(black_box(SENTENCE), &profile, rng).count()
        })
    });

    c.bench_function("typist paragraph (880 chars, typo-heavy)", |b| {
        let profile = TypingProfile::new(90.0, 0.3);
        b.iter(|| {
            let rng = SmallRng::seed_from_u64(42);
            Typist::new(black_box(&paragraph), &profile, rng)
                .map(|event| event.delay_ms)
                .sum::<f64>()
        })
    });
}

fn bench_shadow_replay(c: &mut Criterion) {
    let profile = TypingProfile::new(40.0, 0.2);
    let events: Vec<_> = Typist::new(SENTENCE, &profile, SmallRng::seed_from_u64(1)).collect();

    c.bench_function("shadow buffer replay", |b| {
        b.iter(|| {
            let mut shadow = ShadowBuffer::new();
            for event in &events {
                shadow.apply(black_box(event.key));
            }
            shadow.char_count()
        })
    });
}

fn bench_answer_store(c: &mut Criterion) {
    let records = make_records(5_000);

    c.bench_function("answer store load (5000 records)", |b| {
        b.iter(|| AnswerStore::from_records(black_box(records.clone())))
    });

    let mut store = AnswerStore::from_records(records);
    c.bench_function("answer store lookup + refresh", |b| {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % 5_000;
            let question = format!("question {i}");
            let translation = format!("translation {}", i % 97);
            let hit = store.find(&question, &translation).is_some();
            store.update(&question, &translation, "refreshed", at);
            hit
        })
    });

    c.bench_function("decoy pick (5000 records)", |b| {
        let mut rng = SmallRng::seed_from_u64(9);
        b.iter(|| store.pick_decoy(black_box("answer 1"), &mut rng).map(str::len))
    });
}

criterion_group!(benches, bench_typist, bench_shadow_replay, bench_answer_store);
criterion_main!(benches);
