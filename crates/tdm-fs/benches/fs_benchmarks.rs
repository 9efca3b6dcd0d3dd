use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::fs;
use tdm_fs::{ArchiveCodec, PathTranslator, ZipCodec};
use tempfile::tempdir;

fn translate_benchmark(c: &mut Criterion) {
    let translator = PathTranslator::new("/home/user", "/home/user/.tdm/synced", "/home/user").unwrap();

    c.bench_function("PathTranslator::to_mirror", |b| {
        b.iter(|| translator.to_mirror(black_box("src/../.config/nvim/lua/plugins.lua")).unwrap())
    });

    c.bench_function("PathTranslator::to_tracked", |b| {
        b.iter(|| {
            translator
                .to_tracked(black_box("/home/user/.tdm/synced/.config/nvim/init.lua"))
                .unwrap()
        })
    });
}

fn archive_benchmark(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let source = dir.path().join(".git");
    for i in 0..64 {
        let object = source.join(format!("objects/{:02x}/{:038x}", i, i));
        fs::create_dir_all(object.parent().unwrap()).unwrap();
        fs::write(&object, vec![i as u8; 4096]).unwrap();
    }
    let archive = dir.path().join(".git.zip");
    let restored = dir.path().join("restored");

    c.bench_function("ZipCodec::archive (64 objects)", |b| {
        b.iter(|| ZipCodec.archive(black_box(&source), black_box(&archive)).unwrap())
    });

    c.bench_function("ZipCodec::extract (64 objects)", |b| {
        b.iter(|| ZipCodec.extract(black_box(&archive), black_box(&restored)).unwrap())
    });
}

criterion_group!(benches, translate_benchmark, archive_benchmark);
criterion_main!(benches);
