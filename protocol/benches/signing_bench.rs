// Signing & serialization benchmarks for the SBX transaction engine.
//
// Covers passphrase key derivation, single-message signing and verification,
// canonical serialization, and full transaction signing with and without a
// second signature.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use sbx_protocol::api::FeeSchedule;
use sbx_protocol::config::{Network, NetworkType};
use sbx_protocol::crypto::{sign, verify, KeyPair};
use sbx_protocol::transaction::{
    deserialize, sign_transaction, signed_bytes, unsigned_bytes, TransactionBody,
    TransactionBuilder, Vote, VoteType,
};

const RECIPIENT: &str = "XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi";

fn send_body(keys: &KeyPair) -> TransactionBody {
    let network = Network::default_for(NetworkType::Alphanet);
    TransactionBuilder::send(&network, *keys.public_key(), RECIPIENT, 10)
        .and_then(|b| b.vendor_field("hi from vekexasia"))
        .map(|b| b.timestamp(1).build(&FeeSchedule::default()))
        .unwrap()
}

fn bench_key_derivation(c: &mut Criterion) {
    c.bench_function("secp256k1/key_from_passphrase", |b| {
        b.iter(|| KeyPair::from_passphrase(black_box("mysecret")).unwrap());
    });
}

fn bench_sign_message(c: &mut Criterion) {
    let keys = KeyPair::from_passphrase("mysecret").unwrap();
    let message = b"send 10 SBX to XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi";

    c.bench_function("secp256k1/sign_message", |b| {
        b.iter(|| sign(&keys, black_box(message)));
    });
}

fn bench_verify_signature(c: &mut Criterion) {
    let keys = KeyPair::from_passphrase("mysecret").unwrap();
    let message = b"send 10 SBX to XLkD8W97pijJD9RnYk4zb1exdCQ55GCHoi";
    let signature = sign(&keys, message);

    c.bench_function("secp256k1/verify_signature", |b| {
        b.iter(|| verify(keys.public_key(), black_box(message), &signature));
    });
}

fn bench_serialize(c: &mut Criterion) {
    let keys = KeyPair::from_passphrase("mysecret").unwrap();
    let body = send_body(&keys);
    let tx = sign_transaction(body.clone(), &keys, None).unwrap();
    let bytes = signed_bytes(&tx);

    c.bench_function("serializer/unsigned_bytes", |b| {
        b.iter(|| unsigned_bytes(black_box(&body)));
    });
    c.bench_function("serializer/deserialize", |b| {
        b.iter(|| deserialize(black_box(&bytes)).unwrap());
    });
}

fn bench_sign_transaction(c: &mut Criterion) {
    let keys = KeyPair::from_passphrase("mysecret").unwrap();
    let second = KeyPair::from_passphrase("second secret").unwrap();
    let body = send_body(&keys);

    c.bench_function("transaction/sign", |b| {
        b.iter(|| sign_transaction(body.clone(), &keys, None).unwrap());
    });
    c.bench_function("transaction/sign_with_second", |b| {
        b.iter(|| sign_transaction(body.clone(), &keys, Some(&second)).unwrap());
    });
}

fn bench_vote_sizes(c: &mut Criterion) {
    let network = Network::default_for(NetworkType::Alphanet);
    let keys = KeyPair::from_passphrase("mysecret").unwrap();
    let mut group = c.benchmark_group("transaction/sign_vote");

    for size in [1usize, 10, 33] {
        let votes: Vec<Vote> = (0..size)
            .map(|i| {
                let delegate = KeyPair::from_passphrase(&format!("delegate {}", i)).unwrap();
                Vote::new(VoteType::Add, *delegate.public_key())
            })
            .collect();
        let body = TransactionBuilder::vote(&network, *keys.public_key(), votes)
            .timestamp(1)
            .build(&FeeSchedule::default());

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &body, |b, body| {
            b.iter(|| sign_transaction(body.clone(), &keys, None).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_key_derivation,
    bench_sign_message,
    bench_verify_signature,
    bench_serialize,
    bench_sign_transaction,
    bench_vote_sizes,
);
criterion_main!(benches);
