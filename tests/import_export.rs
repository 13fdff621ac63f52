// Export a store, import it into another, and compare

use chrono::{TimeZone, Utc};
use daykountdown::{DEFAULT_COLOUR, Exporter, Importer, KountdownModel, SortKind, Store, parse_datetime};
use std::fs;
use tempfile::TempDir;

fn open_model(temp: &TempDir, name: &str) -> KountdownModel {
    let store = Store::open(temp.path().join(name)).unwrap();
    KountdownModel::new(store).unwrap()
}

#[test]
fn test_export_then_import_into_fresh_store() {
    let temp = TempDir::new().unwrap();
    let mut source = open_model(&temp, "source.db");

    assert!(source.add_kountdown(
        "Banana",
        "Harvest",
        Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
        "goldenrod"
    ));
    assert!(source.add_kountdown(
        "Apple",
        "",
        Utc.with_ymd_and_hms(2025, 10, 12, 8, 30, 0).unwrap(),
        DEFAULT_COLOUR
    ));
    assert!(source.add_kountdown(
        "Cherry",
        "Blossom 🌸",
        Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
        "hotpink"
    ));

    let export_path = temp.path().join("exported_kountdowns.json");
    assert!(Exporter::export_to_file(source.store(), Some(&export_path)));

    let mut importer = Importer::new(DEFAULT_COLOUR);
    assert!(importer.import_from_file(Some(&export_path)));
    assert_eq!(importer.imported().len(), 3);

    let mut target = open_model(&temp, "target.db");
    for k in importer.imported() {
        let date = parse_datetime(&k.date).unwrap();
        assert!(target.add_kountdown(&k.name, &k.description, date, &k.colour));
    }

    let exported: Vec<_> = source.store().all().unwrap();
    let copied: Vec<_> = target.store().all().unwrap();
    assert_eq!(exported.len(), copied.len());
    for (a, b) in exported.iter().zip(&copied) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.description, b.description);
        assert_eq!(a.date, b.date);
        assert_eq!(a.date_in_ms, b.date_in_ms);
        assert_eq!(a.colour, b.colour);
    }

    target.sort_model(SortKind::AlphabeticalDesc);
    let names: Vec<_> = target.records().into_iter().map(|k| k.name).collect();
    assert_eq!(names, vec!["Cherry", "Banana", "Apple"]);
}

#[test]
fn test_hand_written_file_without_colours() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("handmade.json");
    fs::write(
        &path,
        r#"{
            "kountdowns": [
                {"name": "New Year", "description": "Fireworks", "date": "2026-01-01T00:00:00"},
                {"name": "Birthday", "description": "", "date": "2026-02-14", "colour": "crimson"}
            ]
        }"#,
    )
    .unwrap();

    let mut importer = Importer::new(DEFAULT_COLOUR);
    assert!(importer.import_from_file(Some(&path)));

    let imported = importer.imported();
    assert_eq!(imported[0].colour, DEFAULT_COLOUR);
    assert_eq!(imported[1].colour, "crimson");
    assert_eq!(imported[1].index, 1);

    let mut model = open_model(&temp, "k.db");
    for k in imported {
        assert!(model.add_kountdown(&k.name, &k.description, parse_datetime(&k.date).unwrap(), &k.colour));
    }
    assert_eq!(model.record(1).unwrap().date, "2026-02-14T00:00:00");
}
