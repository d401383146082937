use cyclist_accidents::accidents::FilteredAccident;
use cyclist_accidents::config::PipelineConfig;
use cyclist_accidents::filter::run_filter;
use cyclist_accidents::output::read_accidents;
use cyclist_accidents::weights::{DEFAULT_CELL_SIZE, WeightIndex};
use std::fs;
use std::path::Path;

fn seed_years(config: &PipelineConfig, year_bodies: &[(i32, &str)]) {
    fs::create_dir_all(&config.accidents_dir).unwrap();
    for year in config.years() {
        let body = year_bodies
            .iter()
            .find(|(y, _)| *y == year)
            .map_or("[]", |(_, body)| *body);
        fs::write(config.year_file(year), body).unwrap();
    }
}

fn filter_in(root: &Path, year_bodies: &[(i32, &str)]) -> (PipelineConfig, String) {
    let config = PipelineConfig::rooted_at(root);
    seed_years(&config, year_bodies);

    let mut progress = Vec::new();
    run_filter(&config, &mut progress).expect("filter run failed");
    (config, String::from_utf8(progress).unwrap())
}

#[test]
fn test_single_object_and_non_cyclist_records() {
    let dir = tempfile::tempdir().unwrap();
    let body = r#"[
        {"lat":51.5,"lon":-0.1,"severity":"Slight","casualties":{"mode":"PedalCycle"}},
        {"lat":51.6,"lon":-0.2,"severity":"Fatal","casualties":[{"mode":"Car"}]}
    ]"#;

    let (config, _) = filter_in(dir.path(), &[(2005, body)]);

    assert_eq!(
        fs::read_to_string(&config.output_file).unwrap(),
        r#"[[51.5,-0.1,"Slight"]]"#
    );
}

#[test]
fn test_casualty_sequence_counts_once() {
    let dir = tempfile::tempdir().unwrap();
    let body = r#"[
        {"lat":51.52,"lon":-0.08,"severity":"Serious","casualties":[{"mode":"Car"},{"mode":"PedalCycle"}]}
    ]"#;

    let (config, _) = filter_in(dir.path(), &[(2012, body)]);

    assert_eq!(
        read_accidents(&config.output_file).unwrap(),
        vec![FilteredAccident::new(51.52, -0.08, "Serious")]
    );
}

#[test]
fn test_order_follows_year_then_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let cyclist = |lat: f64| {
        format!(r#"{{"lat":{lat},"lon":-0.1,"severity":"Slight","casualties":{{"mode":"PedalCycle"}}}}"#)
    };
    let body_2005 = format!("[{},{}]", cyclist(51.1), cyclist(51.2));
    let body_2019 = format!("[{}]", cyclist(51.9));
    let body_2010 = format!("[{}]", cyclist(51.5));

    let (config, progress) = filter_in(
        dir.path(),
        &[
            (2019, body_2019.as_str()),
            (2005, body_2005.as_str()),
            (2010, body_2010.as_str()),
        ],
    );

    let latitudes: Vec<f64> = read_accidents(&config.output_file)
        .unwrap()
        .iter()
        .map(|a| a.latitude)
        .collect();
    assert_eq!(latitudes, vec![51.1, 51.2, 51.5, 51.9]);

    let lines: Vec<&str> = progress.lines().collect();
    assert_eq!(lines.len(), 15);
    assert_eq!(lines[0], "0 2005");
    assert_eq!(lines[1], "2 2006");
    assert_eq!(lines[6], "3 2011");
    assert_eq!(lines[14], "3 2019");
}

#[test]
fn test_malformed_records_do_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    let body = r#"[
        {"lat":51.5,"lon":-0.1,"severity":"Slight"},
        "not a record",
        {"lat":51.5,"lon":-0.1,"severity":"Slight","casualties":null},
        {"lat":51.4,"lon":-0.3,"severity":"Fatal","casualties":{"mode":"PedalCycle"}}
    ]"#;
    let config = PipelineConfig::rooted_at(dir.path());
    seed_years(&config, &[(2007, body)]);

    let report = run_filter(&config, &mut Vec::new()).unwrap();

    assert_eq!(report.malformed, 3);
    assert_eq!(report.kept, 1);
    assert_eq!(
        read_accidents(&config.output_file).unwrap(),
        vec![FilteredAccident::new(51.4, -0.3, "Fatal")]
    );
}

#[test]
fn test_filtered_output_feeds_weight_grid() {
    let dir = tempfile::tempdir().unwrap();
    let body = r#"[
        {"lat":51.5012,"lon":-0.1012,"severity":"Slight","casualties":{"mode":"PedalCycle"}},
        {"lat":51.5031,"lon":-0.1044,"severity":"Fatal","casualties":[{"mode":"PedalCycle"}]},
        {"lat":51.5033,"lon":-0.1041,"severity":"Fatal","casualties":[{"mode":"Pedestrian"}]}
    ]"#;

    let (config, _) = filter_in(dir.path(), &[(2015, body)]);
    let accidents = read_accidents(&config.output_file).unwrap();
    let index = WeightIndex::from_accidents(&accidents, DEFAULT_CELL_SIZE);

    assert_eq!(index.len(), 1);
    assert_eq!(index.weight_at(51.5012, -0.1012), 4);
}
