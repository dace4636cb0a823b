/**
 * =================================================================
 * APARATO: INDICATOR PERSISTENCE TEST (V1.0 - SOBERANO)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la doble escritura (datos + espejo LED) y la
 *           mezcla con valores nominales al reabrir.
 * =================================================================
 */

use pyrolink_coordinator::state::IndicatorStore;
use tempfile::tempdir;

#[test]
fn certify_defaults_are_persisted_on_first_open() {
    let workdir = tempdir().expect("directorio efímero");
    let data_path = workdir.path().join("leddata");
    let mirror_path = workdir.path().join("ledstate");

    let store = IndicatorStore::open(data_path.clone(), mirror_path.clone());

    assert_eq!(store.get("show_run_state"), 0);
    assert_eq!(store.get("dongle_sync_interval_ms"), 20_000);
    assert_eq!(store.get("clock_sync_interval_ms"), 2_000);

    // Ambos archivos nacen con el volcado completo.
    let data: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&data_path).unwrap()).unwrap();
    let mirror: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&mirror_path).unwrap()).unwrap();
    assert_eq!(data, mirror);
    assert_eq!(data.get("led_brightness").and_then(|v| v.as_i64()), Some(10));
    println!("✅ INDICATORS: First-open persistence certified.");
}

#[test]
fn certify_updates_survive_reopen() {
    let workdir = tempdir().expect("directorio efímero");
    let data_path = workdir.path().join("leddata");
    let mirror_path = workdir.path().join("ledstate");

    {
        let store = IndicatorStore::open(data_path.clone(), mirror_path.clone());
        store.update("show_run_state", 5);
        store.update("led_brightness", 42);
    }

    let reopened = IndicatorStore::open(data_path, mirror_path);
    assert_eq!(reopened.get("show_run_state"), 5);
    assert_eq!(reopened.get("led_brightness"), 42);
    println!("✅ INDICATORS: Reopen merge certified.");
}

#[test]
fn certify_unknown_keys_and_bad_types_are_ignored() {
    let workdir = tempdir().expect("directorio efímero");
    let data_path = workdir.path().join("leddata");
    let mirror_path = workdir.path().join("ledstate");

    std::fs::write(
        &data_path,
        r#"{"led_brightness": "bright", "phantom_key": 9, "debug_mode": 1}"#,
    )
    .unwrap();

    let store = IndicatorStore::open(data_path, mirror_path);
    // Tipo inválido -> nominal; clave fantasma -> inexistente; válida -> tomada.
    assert_eq!(store.get("led_brightness"), 10);
    assert_eq!(store.get("phantom_key"), 0);
    assert_eq!(store.get("debug_mode"), 1);
    assert!(store.debug_enabled());

    store.update("phantom_key", 3);
    assert_eq!(store.get("phantom_key"), 0, "Las claves fantasma no se crean.");
}

#[test]
fn certify_noop_updates_do_not_rewrite() {
    let workdir = tempdir().expect("directorio efímero");
    let data_path = workdir.path().join("leddata");
    let mirror_path = workdir.path().join("ledstate");

    let store = IndicatorStore::open(data_path.clone(), mirror_path);
    let stamp_before = std::fs::metadata(&data_path).unwrap().modified().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(50));

    store.update("error_state", 0); // valor idéntico al vigente

    let stamp_after = std::fs::metadata(&data_path).unwrap().modified().unwrap();
    assert_eq!(stamp_before, stamp_after, "Un no-cambio no debe tocar disco.");
}
