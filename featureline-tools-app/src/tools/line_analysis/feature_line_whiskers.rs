/*
This tool is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 27/09/2026
Last Modified: 06/10/2026
License: MIT
*/

use crate::tools::*;
use featureline_common::algorithms::whisker;
use featureline_common::configs::Configs;
use featureline_common::features::{FeatureStore, GeoJsonStore, OutputFeature, OutputLayer};
use featureline_common::utils::{get_formatted_elapsed_time, progress_percent};
use std::io::Error;
use std::time::Instant;

/// This tool replaces each line with a "whisker": a straight line crossing it
/// at its mid-length point, perpendicular to it and reaching the whisker
/// width (`--width`) to either side. The direction of a line is taken from its
/// first and last vertices, or, when a sample length is given
/// (`--sample_length`), from the part of the line of that length centred on
/// its midpoint, which better follows curved lines. The width can be read per
/// line from a numeric attribute (`--width_field`). Whiskers keep the
/// attributes of their lines.
pub struct FeatureLineWhiskers {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl FeatureLineWhiskers {
    pub fn new() -> FeatureLineWhiskers {
        // public constructor
        let name = "FeatureLineWhiskers".to_string();
        let toolbox = "Line Analysis".to_string();
        let description =
            "Creates lines perpendicular to the input lines at their centres.".to_string();

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
            name: "Whisker Width".to_owned(),
            flags: vec!["--width".to_owned()],
            description: "Distance the whisker reaches to either side of the line.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Whisker Width Field".to_owned(),
            flags: vec!["--width_field".to_owned()],
            description: "Optional numeric field holding a whisker width for each line.".to_owned(),
            parameter_type: ParameterType::VectorAttributeField(
                AttributeType::Any,
                "--input".to_owned(),
            ),
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Sample Length".to_owned(),
            flags: vec!["--sample_length".to_owned()],
            description: "Optional length of the centre sample that sets each line's direction."
                .to_owned(),
            parameter_type: ParameterType::Float,
            default_value: None,
            optional: true,
        });

        let usage = example_usage(
            &name,
            "-i=streams.geojson -o=whiskers.geojson --width=20.0 --sample_length=10.0",
        );

        FeatureLineWhiskers {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl FeatureLineTool for FeatureLineWhiskers {
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
        let mut width = String::new();
        let mut width_field = String::new();
        let mut sample_length: Option<f64> = None;

        // read the arguments
        for (flag_val, value) in parse_args(&args)? {
            if flag_val == "-i" || flag_val == "-input" {
                input_file = value;
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = value;
            } else if flag_val == "-width" {
                width = value;
            } else if flag_val == "-width_field" {
                width_field = value.trim().to_string();
            } else if flag_val == "-sample_length" && !value.trim().is_empty() {
                sample_length = Some(parse_value(&flag_val, &value)?);
            }
        }
        required(&input_file, "--input")?;
        required(&output_file, "--output")?;
        required(&width, "--width")?;
        let width: f64 = parse_value("--width", &width)?;

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
        output.fields = input.fields();
        let num_features = input.features.len();
        let mut old_progress = 1usize;
        let mut null_count = 0usize;
        for (i, feature) in input.features.iter().enumerate() {
            let value = if width_field.is_empty() {
                width
            } else {
                feature.numeric_attribute(&width_field).unwrap_or(width)
            };
            match whisker(&feature.geometry, value, sample_length) {
                Some(geometry) => output.features.push(OutputFeature {
                    geometry,
                    attributes: feature.attributes.clone(),
                }),
                None => null_count += 1,
            }

            if verbose {
                let progress = progress_percent(i, num_features);
                if progress != old_progress {
                    println!("Progress: {}%", progress);
                    old_progress = progress;
                }
            }
        }

        if verbose {
            println!("Saving data...");
        }
        store.write_layer(&output_file, &output, configs.overwrite_output)?;

        if verbose {
            if null_count > 0 {
                println!(
                    "Warning: no whisker could be made for {} features.",
                    null_count
                );
            }
            if input.skipped_records > 0 {
                println!(
                    "Warning: {} input records were not valid lines and were skipped.",
                    input.skipped_records
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
    use featureline_common::structures::Point2D;
    use std::fs;

    #[test]
    fn test_run_uses_width_field() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("featureline_whiskers_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let lines = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature",
                  "geometry": { "type": "LineString", "coordinates": [[0, 0], [10, 0]] },
                  "properties": { "W": 4 } },
                { "type": "Feature",
                  "geometry": { "type": "LineString", "coordinates": [[0, 5], [0, 15]] },
                  "properties": { "W": null } }
            ]
        }"#;
        fs::write(dir.join("streams.geojson"), lines).unwrap();

        let configs = Configs {
            verbose_mode: false,
            working_directory: format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR),
            overwrite_output: false,
            max_procs: 1,
        };
        let args: Vec<String> = vec!["-i=streams.geojson", "-o=whiskers.geojson", "--width=1", "--width_field=W"]
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        FeatureLineWhiskers::new().run(args.clone(), &configs).unwrap();

        let output = GeoJsonStore::new()
            .read_lines(&dir.join("whiskers.geojson").to_string_lossy())
            .unwrap();
        assert_eq!(output.features.len(), 2);
        assert!((output.features[0].geometry.length() - 8.0).abs() < 1e-9);
        assert!((output.features[1].geometry.length() - 2.0).abs() < 1e-9);
        let centre = Point2D::midpoint(
            &output.features[1].geometry.first_vertex(),
            &output.features[1].geometry.last_vertex(),
        );
        assert!(centre.distance(&Point2D::new(0.0, 10.0)) < 1e-9);

        // the output exists and overwriting is off
        assert!(FeatureLineWhiskers::new().run(args, &configs).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
