//! Throughput of the confidentiality layer.
//!
//! Run with: `cargo bench --bench cipher_benchmark`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use steglock::{CipherBox, PayloadCodec, SymmetricKey};

fn benchmark_cipher(c: &mut Criterion) {
    let mut group = c.benchmark_group("cipher_box");
    let sizes = [("100B", 100), ("1KB", 1024), ("10KB", 10 * 1024)];

    for key_len in [16usize, 32] {
        let cipher = CipherBox::from_slice(&vec![0x24; key_len]).unwrap();
        for (name, size) in sizes {
            let message = vec![0u8; size];
            let blob = cipher.encrypt(&message).unwrap();
            group.throughput(Throughput::Bytes(size as u64));

            group.bench_with_input(
                BenchmarkId::new(format!("encrypt/aes{}", key_len * 8), name),
                &message,
                |b, message| b.iter(|| cipher.encrypt(black_box(message)).unwrap()),
            );
            group.bench_with_input(
                BenchmarkId::new(format!("decrypt/aes{}", key_len * 8), name),
                &blob,
                |b, blob| b.iter(|| cipher.decrypt(black_box(blob)).unwrap()),
            );
        }
    }
    group.finish();
}

fn benchmark_codec(c: &mut Criterion) {
    let key = SymmetricKey::from_bytes(&[0x42; 32]).unwrap();
    let message = vec![0x61u8; 1024];
    let payload = PayloadCodec::pack(&message, &key).unwrap();

    let mut group = c.benchmark_group("payload_codec");
    group.throughput(Throughput::Bytes(message.len() as u64));
    group.bench_function("pack/1KB", |b| {
        b.iter(|| PayloadCodec::pack(black_box(&message), &key).unwrap())
    });
    group.bench_function("unpack/1KB", |b| {
        b.iter(|| PayloadCodec::unpack(black_box(&payload), &key).unwrap())
    });
    group.finish();
}

criterion_group!(benches, benchmark_cipher, benchmark_codec);
criterion_main!(benches);
