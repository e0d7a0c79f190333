/*
This tool is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 20/09/2026
Last Modified: 06/10/2026
License: MIT
*/

use crate::tools::*;
use featureline_common::algorithms::{close_gaps_with_options, GapClosureOptions};
use featureline_common::configs::Configs;
use featureline_common::features::{FeatureStore, GeoJsonStore};
use featureline_common::utils::get_formatted_elapsed_time;
use std::io::Error;
use std::time::Instant;

/// This tool creates connector lines that close the gaps between the
/// endpoints of nearby, disconnected lines. Each endpoint of the input lines
/// (`--input`) is linked to at most `--connections` of the closest endpoints
/// of *other* lines lying within the search radius (`--radius`). An endpoint
/// is never linked to the other end of its own line, even when a closed or
/// hooked line brings the two close together. Coincident endpoints of two
/// different lines are linked with a zero-length connector.
///
/// Each output connector carries the ids of the endpoints it joins (`A_NODE`,
/// `B_NODE`; the start of line *i* is 2*i* and its end 2*i* + 1) and its length
/// (`NEAR_DIST`). Attribute values can be copied from the two joined lines with
/// `--fields`; each listed field `F` becomes `A_F` and `B_F`. Unless
/// `--all_pairs` is given, a gap is bridged by a single connector even when
/// both of its endpoints choose each other.
pub struct FeatureLineGapClosure {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl FeatureLineGapClosure {
    pub fn new() -> FeatureLineGapClosure {
        // public constructor
        let name = "FeatureLineGapClosure".to_string();
        let toolbox = "Line Analysis".to_string();
        let description =
            "Creates connector lines between the nearby endpoints of different lines.".to_string();

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
            description: "Output vector line file of connectors.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Vector(
                VectorGeometryType::Line,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Search Radius".to_owned(),
            flags: vec!["--radius".to_owned()],
            description: "Maximum distance between linked endpoints, in map units.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Number of Connections".to_owned(),
            flags: vec!["--connections".to_owned()],
            description: "Maximum number of connectors starting at each endpoint.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: Some("1".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Transfer Fields".to_owned(),
            flags: vec!["--fields".to_owned()],
            description: "Comma-separated input fields copied to A_ and B_ output fields."
                .to_owned(),
            parameter_type: ParameterType::StringList,
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Keep Reciprocal Connectors?".to_owned(),
            flags: vec!["--all_pairs".to_owned()],
            description: "Create both A->B and B->A when two endpoints choose each other."
                .to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        let usage = example_usage(
            &name,
            "-i=roads.geojson -o=gaps.geojson --radius=25.0 --connections=2 --fields=NAME,CLASS",
        );

        FeatureLineGapClosure {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl FeatureLineTool for FeatureLineGapClosure {
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
        let mut search_radius = String::new();
        let mut connection_count = 1usize;
        let mut transfer_fields: Vec<String> = vec![];
        let mut options = GapClosureOptions::default();

        // read the arguments
        for (flag_val, value) in parse_args(&args)? {
            if flag_val == "-i" || flag_val == "-input" {
                input_file = value;
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = value;
            } else if flag_val == "-radius" {
                search_radius = value;
            } else if flag_val == "-connections" {
                connection_count = parse_value(&flag_val, &value)?;
            } else if flag_val == "-fields" {
                transfer_fields = value
                    .split(|c| c == ',' || c == ';')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            } else if flag_val == "-all_pairs" {
                options.dedupe_reciprocal = !parse_switch(&value);
            }
        }
        required(&input_file, "--input")?;
        required(&output_file, "--output")?;
        required(&search_radius, "--radius")?;
        let search_radius: f64 = parse_value("--radius", &search_radius)?;

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

        if verbose {
            println!("Finding nearby endpoints...");
        }
        let result = close_gaps_with_options(
            &input.features,
            &transfer_fields,
            search_radius,
            connection_count,
            &options,
        )?;

        if verbose {
            println!("Saving data...");
        }
        store.write_layer(
            &output_file,
            &result.to_output_layer(),
            configs.overwrite_output,
        )?;

        if verbose {
            println!("Connectors created: {}", result.connectors.len());
            if !result.dropped_fields.is_empty() {
                println!(
                    "Warning: the following fields could not be transferred: {}",
                    result.dropped_fields.join(", ")
                );
            }
            let skipped = input.skipped_records + result.skipped_lines;
            if skipped > 0 {
                println!("Warning: {} input records were not valid lines and were skipped.", skipped);
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
    use featureline_common::features::FieldData;
    use std::fs;

    const LINES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "id": 1,
              "geometry": { "type": "LineString", "coordinates": [[0, 0], [10, 0]] },
              "properties": { "NAME": "Main" } },
            { "type": "Feature", "id": 2,
              "geometry": { "type": "LineString", "coordinates": [[12, 0], [22, 0]] },
              "properties": { "NAME": "Oak" } }
        ]
    }"#;

    #[test]
    fn test_run_writes_connectors() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("featureline_gap_closure_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let wd = format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR);
        fs::write(dir.join("roads.geojson"), LINES).unwrap();

        let configs = Configs {
            verbose_mode: false,
            working_directory: wd,
            overwrite_output: true,
            max_procs: 1,
        };
        let args: Vec<String> = vec!["-i=roads.geojson", "-o=gaps.geojson", "--radius=5", "--fields=NAME"]
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        FeatureLineGapClosure::new().run(args, &configs).unwrap();

        let output = GeoJsonStore::new()
            .read_lines(&dir.join("gaps.geojson").to_string_lossy())
            .unwrap();
        assert_eq!(output.features.len(), 1);
        let attrs = &output.features[0].attributes;
        assert_eq!(attrs.get("A_NODE"), Some(&FieldData::Int(1)));
        assert_eq!(attrs.get("B_NODE"), Some(&FieldData::Int(2)));
        assert_eq!(attrs.get("B_NAME"), Some(&FieldData::Text("Oak".to_string())));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_run_requires_radius() {
        let args = vec!["-i=roads.geojson".to_string(), "-o=gaps.geojson".to_string()];
        assert!(FeatureLineGapClosure::new().run(args, &Configs::new()).is_err());
    }
}
