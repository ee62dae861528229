use std::io::Write;

use skirmish_sim::SimConfig;

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn partial_ron_keeps_defaults_elsewhere() {
    let file = config_file("(influence: (radius: 5), deploy: (waypoint_cap: 3))");
    let sim = SimConfig {
        ai_config: Some(file.path().to_path_buf()),
        ..SimConfig::default()
    };
    let ai = sim.load_ai_config().unwrap();
    assert_eq!(ai.influence.radius, 5);
    assert_eq!(ai.deploy.waypoint_cap, 3);
    assert_eq!(ai.unit, Default::default());
}

#[test]
fn malformed_ron_names_the_file() {
    let file = config_file("(influence: (radius: \"far\"))");
    let sim = SimConfig {
        ai_config: Some(file.path().to_path_buf()),
        ..SimConfig::default()
    };
    let err = sim.load_ai_config().unwrap_err();
    assert!(format!("{err}").contains("failed to parse AI config RON"));
}

#[test]
fn out_of_range_values_fail_validation() {
    let file = config_file("(unit: (escort_health: 2.0))");
    let sim = SimConfig {
        ai_config: Some(file.path().to_path_buf()),
        ..SimConfig::default()
    };
    assert!(sim.load_ai_config().is_err());
}

#[test]
fn missing_file_is_an_error() {
    let sim = SimConfig {
        ai_config: Some("/definitely/not/here.ron".into()),
        ..SimConfig::default()
    };
    assert!(sim.load_ai_config().is_err());
}
