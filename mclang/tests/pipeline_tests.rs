use indoc::indoc;
use mclang::traits::Parser;
use mclang::{
    CancelFlag, MemoryArchive, ModOutcome, NullSink, ProgressEvent, RunOptions, TranslationMap,
    run,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    _temp: TempDir,
    mods: PathBuf,
    out: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let mods = temp.path().join("mods");
        let out = temp.path().join("output");
        fs::create_dir(&mods).unwrap();
        Workspace {
            _temp: temp,
            mods,
            out,
        }
    }

    fn jar(&self, name: &str, entries: &[(&str, &str)]) -> PathBuf {
        let archive = entries
            .iter()
            .fold(MemoryArchive::new(), |a, (n, c)| a.with_entry(*n, *c));
        let path = self.mods.join(name);
        archive.write_to(&path).unwrap();
        path
    }

    fn opts(&self) -> RunOptions {
        RunOptions::new(&self.mods, &self.out).with_target_lang("ru_ru")
    }

    fn mod_dir(&self, mod_id: &str) -> PathBuf {
        self.out.join(mod_id)
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_missing_key_scenario() {
    let ws = Workspace::new();
    ws.jar(
        "greeter-1.0.jar",
        &[
            ("assets/greeter/lang/en_us.json", r#"{"a":"Hello","b":"World"}"#),
            ("assets/greeter/lang/ru_ru.json", r#"{"a":"Привет"}"#),
        ],
    );

    let summary = run(&ws.opts(), &mut NullSink).unwrap();
    assert_eq!(summary.scanned, 1);
    assert_eq!(summary.partial, 1);

    let dir = ws.mod_dir("greeter-1.0");
    assert_eq!(read(&dir.join("diff.json")), "{\n  \"b\": \"World\"\n}\n");
    let target = TranslationMap::read_from(dir.join("ru_ru.json")).unwrap();
    assert_eq!(target.get("a"), Some("Привет"));
    let reference = TranslationMap::read_from(dir.join("en_us.json")).unwrap();
    assert_eq!(reference.len(), 2);
}

#[test]
fn test_absent_target_reports_whole_mod() {
    let ws = Workspace::new();
    ws.jar("solo.jar", &[("assets/solo/lang/en_us.json", r#"{"a":"Hi"}"#)]);

    let summary = run(&ws.opts(), &mut NullSink).unwrap();
    assert_eq!(summary.partial, 1);

    let dir = ws.mod_dir("solo");
    assert_eq!(read(&dir.join("diff.json")), "{\n  \"a\": \"Hi\"\n}\n");
    assert_eq!(read(&dir.join("ru_ru.json")), "{}\n");
}

#[test]
fn test_fully_translated_mod_leaves_no_folder() {
    let ws = Workspace::new();
    ws.jar(
        "done.jar",
        &[
            ("assets/done/lang/en_us.json", r#"{"a":"Hi","b":""}"#),
            ("assets/done/lang/ru_ru.json", r#"{"a":"X","b":"Y"}"#),
        ],
    );

    let summary = run(&ws.opts(), &mut NullSink).unwrap();
    assert_eq!(summary.complete, 1);
    assert!(summary.reports.is_empty());
    assert!(!ws.mod_dir("done").exists());
}

#[test]
fn test_archive_without_translations_is_skipped_and_run_continues() {
    let ws = Workspace::new();
    ws.jar("a-library.jar", &[("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\n")]);
    ws.jar("b-mod.jar", &[("assets/b/lang/en_us.json", r#"{"k":"V"}"#)]);

    let summary = run(&ws.opts(), &mut NullSink).unwrap();
    assert_eq!(summary.scanned, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.partial, 1);
    assert_eq!(summary.mods_with("skipped"), vec!["a-library"]);
    assert!(!ws.mod_dir("a-library").exists());
    assert!(ws.mod_dir("b-mod").join("diff.json").exists());
}

#[test]
fn test_corrupt_archive_is_skipped_and_run_continues() {
    let ws = Workspace::new();
    fs::write(ws.mods.join("broken.jar"), b"PK\x03\x04 truncated").unwrap();
    ws.jar("fine.jar", &[("assets/fine/lang/en_us.json", r#"{"k":"V"}"#)]);

    let summary = run(&ws.opts(), &mut NullSink).unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.partial, 1);
    let broken = summary.find("broken").unwrap();
    assert!(broken.outcome.reason().unwrap().contains("not an archive"));
}

/// A stored, empty `en_us.json` whose zip64 extra field claims an
/// uncompressed size of 2^60 bytes.
fn jar_with_forged_size() -> Vec<u8> {
    const NAME: &[u8] = b"assets/bomb/lang/en_us.json";
    let mut extra = Vec::new();
    extra.extend_from_slice(&0x0001u16.to_le_bytes());
    extra.extend_from_slice(&8u16.to_le_bytes());
    extra.extend_from_slice(&(1u64 << 60).to_le_bytes());

    let mut jar = Vec::new();
    // local file header
    jar.extend_from_slice(&0x04034b50u32.to_le_bytes());
    jar.extend_from_slice(&45u16.to_le_bytes());
    jar.extend_from_slice(&[0; 12]); // flags, method, time, date, crc
    jar.extend_from_slice(&0u32.to_le_bytes());
    jar.extend_from_slice(&u32::MAX.to_le_bytes());
    jar.extend_from_slice(&(NAME.len() as u16).to_le_bytes());
    jar.extend_from_slice(&(extra.len() as u16).to_le_bytes());
    jar.extend_from_slice(NAME);
    jar.extend_from_slice(&extra);

    let central_offset = jar.len() as u32;
    jar.extend_from_slice(&0x02014b50u32.to_le_bytes());
    jar.extend_from_slice(&45u16.to_le_bytes());
    jar.extend_from_slice(&45u16.to_le_bytes());
    jar.extend_from_slice(&[0; 12]); // flags, method, time, date, crc
    jar.extend_from_slice(&0u32.to_le_bytes());
    jar.extend_from_slice(&u32::MAX.to_le_bytes());
    jar.extend_from_slice(&(NAME.len() as u16).to_le_bytes());
    jar.extend_from_slice(&(extra.len() as u16).to_le_bytes());
    jar.extend_from_slice(&[0; 10]); // comment len, disk, attributes
    jar.extend_from_slice(&0u32.to_le_bytes());
    jar.extend_from_slice(NAME);
    jar.extend_from_slice(&extra);
    let central_size = jar.len() as u32 - central_offset;

    jar.extend_from_slice(&0x06054b50u32.to_le_bytes());
    jar.extend_from_slice(&[0; 4]);
    jar.extend_from_slice(&1u16.to_le_bytes());
    jar.extend_from_slice(&1u16.to_le_bytes());
    jar.extend_from_slice(&central_size.to_le_bytes());
    jar.extend_from_slice(&central_offset.to_le_bytes());
    jar.extend_from_slice(&0u16.to_le_bytes());
    jar
}

#[test]
fn test_forged_entry_size_does_not_stop_run() {
    let ws = Workspace::new();
    fs::write(ws.mods.join("a_bomb.jar"), jar_with_forged_size()).unwrap();
    ws.jar("b_ok.jar", &[("assets/ok/lang/en_us.json", r#"{"k":"V"}"#)]);

    let summary = run(&ws.opts(), &mut NullSink).unwrap();
    assert_eq!(summary.scanned, 2);
    assert_eq!(summary.find("b_ok").unwrap().outcome, ModOutcome::Partial { missing: 1 });
    assert!(ws.mod_dir("b_ok").join("diff.json").exists());
    assert!(!ws.mod_dir("a_bomb").exists());
}

#[test]
fn test_malformed_reference_is_reported() {
    let ws = Workspace::new();
    ws.jar(
        "bad.jar",
        &[("assets/bad/lang/en_us.json", r#"{"a": ["not", "flat"]}"#)],
    );

    let summary = run(&ws.opts(), &mut NullSink).unwrap();
    assert_eq!(summary.malformed, 1);
    assert_eq!(summary.skipped_or_malformed(), 1);
    assert!(matches!(
        summary.find("bad").unwrap().outcome,
        ModOutcome::Malformed { .. }
    ));
    assert!(!ws.mod_dir("bad").exists());
}

#[test]
fn test_second_run_is_byte_identical() {
    let ws = Workspace::new();
    let reference = indoc! {r#"
        {
          "block.mill.gear": "Gear",
          "block.mill.shaft": "Shaft",
          "item.mill.wrench": "Wrench",
          "tooltip.mill.hint": "Right-click to rotate"
        }
    "#};
    let target = indoc! {r#"
        {
          "block.mill.shaft": "Вал",
          "tooltip.mill.hint": ""
        }
    "#};
    ws.jar(
        "mill.jar",
        &[
            ("assets/mill/lang/en_us.json", reference),
            ("assets/mill/lang/ru_ru.json", target),
        ],
    );
    ws.jar(
        "done.jar",
        &[
            ("assets/done/lang/en_us.json", r#"{"a":"A"}"#),
            ("assets/done/lang/ru_ru.json", r#"{"a":"А"}"#),
        ],
    );

    run(&ws.opts(), &mut NullSink).unwrap();
    let first = fs::read(ws.mod_dir("mill").join("diff.json")).unwrap();
    assert!(!ws.mod_dir("done").exists());

    run(&ws.opts(), &mut NullSink).unwrap();
    let second = fs::read(ws.mod_dir("mill").join("diff.json")).unwrap();
    assert!(!ws.mod_dir("done").exists());

    assert_eq!(first, second);
    let diff = TranslationMap::from_bytes(&second).unwrap();
    assert_eq!(
        diff.keys().collect::<Vec<_>>(),
        vec!["block.mill.gear", "item.mill.wrench", "tooltip.mill.hint"]
    );
}

#[test]
fn test_partial_then_complete_removes_folder() {
    let ws = Workspace::new();
    ws.jar(
        "mod.jar",
        &[
            ("assets/mod/lang/en_us.json", r#"{"a":"A","b":"B"}"#),
            ("assets/mod/lang/ru_ru.json", r#"{"a":"А"}"#),
        ],
    );
    let summary = run(&ws.opts(), &mut NullSink).unwrap();
    assert_eq!(summary.partial, 1);
    assert!(ws.mod_dir("mod").exists());

    ws.jar(
        "mod.jar",
        &[
            ("assets/mod/lang/en_us.json", r#"{"a":"A","b":"B"}"#),
            ("assets/mod/lang/ru_ru.json", r#"{"a":"А","b":"Б"}"#),
        ],
    );
    let summary = run(&ws.opts(), &mut NullSink).unwrap();
    assert_eq!(summary.complete, 1);
    assert!(!ws.mod_dir("mod").exists());
}

#[test]
fn test_cancel_between_mods() {
    let ws = Workspace::new();
    for name in ["a.jar", "b.jar", "c.jar"] {
        ws.jar(name, &[("assets/x/lang/en_us.json", r#"{"k":"V"}"#)]);
    }
    let cancel = CancelFlag::new();
    let opts = ws.opts().with_cancel(cancel.clone());

    let mut finished = Vec::new();
    let mut cancelled_remaining = None;
    let mut sink = |event: ProgressEvent<'_>| match event {
        ProgressEvent::ModFinished(report) => {
            finished.push(report.mod_id.clone());
            cancel.cancel();
        }
        ProgressEvent::Cancelled { remaining } => cancelled_remaining = Some(remaining),
        _ => {}
    };
    let summary = run(&opts, &mut sink).unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.scanned, 1);
    assert_eq!(finished, vec!["a"]);
    assert_eq!(cancelled_remaining, Some(2));
    assert!(ws.mod_dir("a").join("diff.json").exists());
    assert!(!ws.mod_dir("b").exists());
}

#[test]
fn test_events_arrive_in_order() {
    let ws = Workspace::new();
    ws.jar("one.jar", &[("assets/one/lang/en_us.json", r#"{"k":"V"}"#)]);

    let mut kinds = Vec::new();
    let mut sink = |event: ProgressEvent<'_>| {
        kinds.push(match event {
            ProgressEvent::Started { archives, .. } => format!("started:{}", archives),
            ProgressEvent::ModStarted { mod_id, .. } => format!("mod:{}", mod_id),
            ProgressEvent::Warning { .. } => "warning".to_string(),
            ProgressEvent::ModFinished(r) => format!("done:{}", r.outcome.label()),
            ProgressEvent::Cancelled { .. } => "cancelled".to_string(),
            ProgressEvent::Finished(s) => format!("finished:{}", s.scanned),
        })
    };
    run(&ws.opts(), &mut sink).unwrap();
    assert_eq!(
        kinds,
        vec!["started:1", "mod:one", "done:partial", "finished:1"]
    );
}

#[test]
fn test_empty_input_dir_is_success() {
    let ws = Workspace::new();
    let summary = run(&ws.opts(), &mut NullSink).unwrap();
    assert_eq!(summary.scanned, 0);
    assert!(ws.out.is_dir());
    assert_eq!(fs::read_dir(&ws.out).unwrap().count(), 0);
}

#[test]
fn test_input_path_that_is_a_file_is_fatal() {
    let ws = Workspace::new();
    let file = ws.mods.join("not-a-dir.txt");
    fs::write(&file, "x").unwrap();
    let opts = RunOptions::new(&file, &ws.out);
    let err = run(&opts, &mut NullSink).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("not a directory"));
}

#[test]
fn test_unwritable_output_root_is_fatal() {
    let ws = Workspace::new();
    ws.jar("a.jar", &[("assets/a/lang/en_us.json", r#"{"k":"V"}"#)]);
    let blocker = ws.mods.join("..").join("blocker");
    fs::write(&blocker, b"").unwrap();
    let opts = RunOptions::new(&ws.mods, blocker.join("output"));
    let err = run(&opts, &mut NullSink).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_custom_extensions_and_languages() {
    let ws = Workspace::new();
    ws.jar(
        "pack.zip",
        &[
            ("assets/pack/lang/en_us.json", r#"{"a":"A","b":"B"}"#),
            ("assets/pack/lang/zh_cn.json", r#"{"a":"甲"}"#),
        ],
    );
    ws.jar("ignored.jar", &[("assets/x/lang/en_us.json", r#"{"k":"V"}"#)]);

    let opts = RunOptions::new(&ws.mods, &ws.out)
        .with_target_lang("zh_CN")
        .with_extensions(["zip"]);
    let summary = run(&opts, &mut NullSink).unwrap();
    assert_eq!(summary.scanned, 1);
    let dir = ws.mod_dir("pack");
    assert!(dir.join("zh_cn.json").exists());
    assert_eq!(read(&dir.join("diff.json")), "{\n  \"b\": \"B\"\n}\n");
}

#[test]
fn test_duplicate_mod_identifiers_are_skipped() {
    let ws = Workspace::new();
    ws.jar("same.jar", &[("assets/a/lang/en_us.json", r#"{"k":"V"}"#)]);
    ws.jar("same.zip", &[("assets/a/lang/en_us.json", r#"{"k":"W"}"#)]);

    let opts = ws.opts().with_extensions(["jar", "zip"]);
    let summary = run(&opts, &mut NullSink).unwrap();
    assert_eq!(summary.scanned, 2);
    assert_eq!(summary.partial, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        read(&ws.mod_dir("same").join("diff.json")),
        "{\n  \"k\": \"V\"\n}\n"
    );
}
