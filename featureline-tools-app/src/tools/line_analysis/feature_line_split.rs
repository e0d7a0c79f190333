/*
This tool is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 26/09/2026
Last Modified: 06/10/2026
License: MIT
*/

use crate::tools::*;
use featureline_common::algorithms::{split_by_count, split_by_length};
use featureline_common::configs::Configs;
use featureline_common::features::{
    AttributeField, FeatureStore, FieldData, FieldDataType, GeoJsonStore, OutputFeature,
    OutputLayer,
};
use featureline_common::structures::Polyline;
use featureline_common::utils::{get_formatted_elapsed_time, progress_percent};
use std::io::{Error, ErrorKind};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
enum SplitMethod {
    Length,
    Count,
}

/// This tool splits each line into segments. With the `length` method
/// (`--method`) each segment is `--value` map units long and the last one
/// takes the remainder; adding `--best_fit` instead divides the line into the
/// nearest whole number of equal segments. With the `count` method the line
/// is divided into `--value` equal segments. The split value can be read per
/// line from a numeric attribute (`--value_field`).
///
/// Segments may be made to overlap their neighbours by a percentage of the
/// segment length (`--overlap`); the two ends of the input line are never
/// extended. Each output segment keeps the attributes of its line and gains
/// its 1-based position along the line (`Split_ID`).
pub struct FeatureLineSplit {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl FeatureLineSplit {
    pub fn new() -> FeatureLineSplit {
        // public constructor
        let name = "FeatureLineSplit".to_string();
        let toolbox = "Line Analysis".to_string();
        let description =
            "Splits lines into segments of a target length or a target count.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Vector Lines File".to_owned(),
            flags: vec!["-i".to_owned(), "--input".to_owned()],
            description: "Input vector line file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Vector(
                VectorGeometryType::Line,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output Vector File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output vector line file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Vector(
                VectorGeometryType::Line,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Split Value".to_owned(),
            flags: vec!["--value".to_owned()],
            description: "Target segment length or segment count.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Split Value Field".to_owned(),
            flags: vec!["--value_field".to_owned()],
            description: "Optional numeric field holding a split value for each line.".to_owned(),
            parameter_type: ParameterType::VectorAttributeField(
                AttributeType::Any,
                "--input".to_owned(),
            ),
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Split Method".to_owned(),
            flags: vec!["--method".to_owned()],
            description: "Treat the split value as a segment length or a segment count.".to_owned(),
            parameter_type: ParameterType::OptionList(vec![
                "length".to_owned(),
                "count".to_owned(),
            ]),
            default_value: Some("length".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Overlap Percentage".to_owned(),
            flags: vec!["--overlap".to_owned()],
            description: "Overlap between neighbouring segments, as a percentage of the segment length."
                .to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("0.0".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Best Fit?".to_owned(),
            flags: vec!["--best_fit".to_owned()],
            description: "Adjust the segment length so that each line divides into equal segments."
                .to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        let usage = example_usage(
            &name,
            "-i=streams.geojson -o=reaches.geojson --value=100.0 --method=length --overlap=10 --best_fit",
        );

        FeatureLineSplit {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl FeatureLineTool for FeatureLineSplit {
    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        parameters_to_json(&self.parameters)
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run(&self, args: Vec<String>, configs: &Configs) -> Result<(), Error> {
        let mut input_file = String::new();
        let mut output_file = String::new();
        let mut split_value = String::new();
        let mut value_field = String::new();
        let mut method = SplitMethod::Length;
        let mut overlap_percentage = 0f64;
        let mut best_fit = false;

        // read the arguments
        for (flag_val, value) in parse_args(&args)? {
            if flag_val == "-i" || flag_val == "-input" {
                input_file = value;
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = value;
            } else if flag_val == "-value" {
                split_value = value;
            } else if flag_val == "-value_field" {
                value_field = value.trim().to_string();
            } else if flag_val == "-method" {
                method = match value.trim().to_lowercase().as_str() {
                    "length" => SplitMethod::Length,
                    "count" | "segment count" => SplitMethod::Count,
                    _ => {
                        return Err(Error::new(
                            ErrorKind::InvalidInput,
                            format!("Unrecognized split method '{}'.", value),
                        ))
                    }
                };
            } else if flag_val == "-overlap" {
                overlap_percentage = parse_value(&flag_val, &value)?;
            } else if flag_val == "-best_fit" {
                best_fit = parse_switch(&value);
            }
        }
        required(&input_file, "--input")?;
        required(&output_file, "--output")?;
        required(&split_value, "--value")?;
        let split_value: f64 = parse_value("--value", &split_value)?;

        let verbose = configs.verbose_mode;
        if verbose {
            welcome(&self.get_tool_name());
        }

        let start = Instant::now();
        let input_file = resolve_path(&input_file, &configs.working_directory);
        let output_file = resolve_path(&output_file, &configs.working_directory);

        let store = GeoJsonStore::new();
        if verbose {
            println!("Reading data...");
        }
        let input = store.read_lines(&input_file)?;

        let mut output = OutputLayer::default();
        output.fields = input
            .fields()
            .into_iter()
            .filter(|f| f.name != "Split_ID")
            .collect();
        output.fields.push(AttributeField::new("Split_ID", FieldDataType::Int));
        let skipped_records = input.skipped_records;
        let features = Arc::new(input.features);
        let num_features = features.len();

        // multithreading setup
        let mut num_procs = num_cpus::get() as isize;
        let max_procs = configs.max_procs;
        if max_procs > 0 && max_procs < num_procs {
            num_procs = max_procs;
        }
        let (tx, rx) = mpsc::channel();
        let feature_list = Arc::new(Mutex::new(0..num_features));
        for _ in 0..num_procs {
            let features = features.clone();
            let feature_list = feature_list.clone();
            let value_field = value_field.clone();
            let tx = tx.clone();
            thread::spawn(move || loop {
                let i = match feature_list.lock() {
                    Ok(mut list) => match list.next() {
                        Some(i) => i,
                        None => break,
                    },
                    Err(_) => break,
                };
                let feature = &features[i];
                let value = if value_field.is_empty() {
                    split_value
                } else {
                    feature.numeric_attribute(&value_field).unwrap_or(split_value)
                };
                let split = match method {
                    SplitMethod::Length => {
                        split_by_length(&feature.geometry, value, overlap_percentage, best_fit)
                    }
                    SplitMethod::Count => {
                        // counts are rounded, with a minimum of one piece
                        let count = value.round().max(1f64) as usize;
                        split_by_count(&feature.geometry, count, overlap_percentage)
                    }
                };
                if tx.send((i, split)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        let mut splits: Vec<Option<Result<Vec<Polyline>, Error>>> =
            (0..num_features).map(|_| None).collect();
        let mut old_progress = 1usize;
        for i in 0..num_features {
            let (index, split) = rx.recv().map_err(|_| {
                Error::new(ErrorKind::Other, "A worker thread stopped before finishing.")
            })?;
            splits[index] = Some(split);

            if verbose {
                let progress = progress_percent(i, num_features);
                if progress != old_progress {
                    println!("Progress: {}%", progress);
                    old_progress = progress;
                }
            }
        }

        let mut not_split = 0usize;
        for (feature, split) in features.iter().zip(splits.into_iter()) {
            // a bad value read from a feature only affects that feature
            let pieces = match split {
                Some(Ok(pieces)) => pieces,
                Some(Err(e)) if value_field.is_empty() => return Err(e),
                _ => vec![],
            };
            if pieces.is_empty() {
                not_split += 1;
            }
            for (j, geometry) in pieces.into_iter().enumerate() {
                let mut attributes = feature.attributes.clone();
                attributes.insert("Split_ID".to_string(), FieldData::Int(j as i64 + 1));
                output.features.push(OutputFeature {
                    geometry,
                    attributes,
                });
            }
        }

        if verbose {
            println!("Saving data...");
        }
        store.write_layer(&output_file, &output, configs.overwrite_output)?;

        if verbose {
            println!("Segments created: {}", output.features.len());
            if not_split > 0 {
                println!(
                    "Warning: {} features could not be split and were not output.",
                    not_split
                );
            }
            if skipped_records > 0 {
                println!(
                    "Warning: {} input records were not valid lines and were skipped.",
                    skipped_records
                );
            }
            let elapsed_time = get_formatted_elapsed_time(start);
            println!("{}", &format!("Elapsed Time: {}", elapsed_time));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_run_keeps_feature_order_across_threads() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("featureline_split_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let lines = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "id": 7,
                  "geometry": { "type": "LineString", "coordinates": [[0, 0], [10, 0]] },
                  "properties": { "PIECES": 2 } },
                { "type": "Feature", "id": 8,
                  "geometry": { "type": "LineString", "coordinates": [[0, 5], [9, 5]] },
                  "properties": { "PIECES": 3 } },
                { "type": "Feature", "id": 9,
                  "geometry": { "type": "LineString", "coordinates": [[0, 9], [4, 9]] },
                  "properties": { "PIECES": "none" } }
            ]
        }"#;
        fs::write(dir.join("streams.geojson"), lines).unwrap();

        let configs = Configs {
            verbose_mode: false,
            working_directory: format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR),
            overwrite_output: true,
            max_procs: 2,
        };
        let args: Vec<String> = vec![
            "-i=streams.geojson",
            "-o=reaches.geojson",
            "--value=1",
            "--value_field=PIECES",
            "--method=count",
        ]
        .into_iter()
        .map(|s| s.to_string())
        .collect();
        FeatureLineSplit::new().run(args, &configs).unwrap();

        let output = GeoJsonStore::new()
            .read_lines(&dir.join("reaches.geojson").to_string_lossy())
            .unwrap();
        // 2 + 3 pieces, and the unreadable count falls back to a single piece
        assert_eq!(output.features.len(), 6);
        let ids: Vec<Option<&FieldData>> = output
            .features
            .iter()
            .map(|f| f.attributes.get("Split_ID"))
            .collect();
        assert_eq!(
            ids,
            vec![
                Some(&FieldData::Int(1)),
                Some(&FieldData::Int(2)),
                Some(&FieldData::Int(1)),
                Some(&FieldData::Int(2)),
                Some(&FieldData::Int(3)),
                Some(&FieldData::Int(1)),
            ]
        );
        assert!((output.features[1].geometry.length() - 5.0).abs() < 1e-9);
        assert!((output.features[4].geometry.length() - 3.0).abs() < 1e-9);
        assert!((output.features[5].geometry.length() - 4.0).abs() < 1e-9);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let args: Vec<String> = vec!["-i=a.geojson", "-o=b.geojson", "--value=5", "--method=area"]
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let err = FeatureLineSplit::new().run(args, &Configs::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
