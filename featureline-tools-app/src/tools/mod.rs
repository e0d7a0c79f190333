pub mod line_analysis;

use featureline_common::configs::Configs;
use serde_json;
use std::env;
use std::io::{Error, ErrorKind};
use std::path;
use std::str::FromStr;

#[derive(Default)]
pub struct ToolManager {
    pub configs: Configs,
    tool_names: Vec<String>,
}

impl ToolManager {
    pub fn new(configs: &Configs) -> Result<ToolManager, Error> {
        let mut tool_names = vec![];
        // line_analysis
        tool_names.push("FeatureLineCorridorAssembly".to_string());
        tool_names.push("FeatureLineGapClosure".to_string());
        tool_names.push("FeatureLinePull".to_string());
        tool_names.push("FeatureLineRelativeAngle".to_string());
        tool_names.push("FeatureLineSplit".to_string());
        tool_names.push("FeatureLineWhiskers".to_string());

        let tm = ToolManager {
            configs: configs.clone(),
            tool_names,
        };
        Ok(tm)
    }

    fn get_tool(&self, tool_name: &str) -> Option<Box<dyn FeatureLineTool + 'static>> {
        match tool_name.to_lowercase().replace("_", "").as_ref() {
            // line_analysis
            "featurelinecorridorassembly" => {
                Some(Box::new(line_analysis::FeatureLineCorridorAssembly::new()))
            }
            "featurelinegapclosure" => Some(Box::new(line_analysis::FeatureLineGapClosure::new())),
            "featurelinepull" => Some(Box::new(line_analysis::FeatureLinePull::new())),
            "featurelinerelativeangle" => {
                Some(Box::new(line_analysis::FeatureLineRelativeAngle::new()))
            }
            "featurelinesplit" => Some(Box::new(line_analysis::FeatureLineSplit::new())),
            "featurelinewhiskers" => Some(Box::new(line_analysis::FeatureLineWhiskers::new())),
            _ => None,
        }
    }

    fn unrecognized(tool_name: &str) -> Error {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Unrecognized tool name {}.", tool_name),
        )
    }

    pub fn run_tool(&self, tool_name: String, args: Vec<String>) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => tool.run(args, &self.configs),
            None => Err(ToolManager::unrecognized(&tool_name)),
        }
    }

    pub fn tool_help(&self, tool_name: String) -> Result<(), Error> {
        if !tool_name.is_empty() {
            match self.get_tool(tool_name.as_ref()) {
                Some(tool) => println!("{}", get_help(tool)?),
                None => return Err(ToolManager::unrecognized(&tool_name)),
            }
        } else {
            for (i, val) in self.tool_names.iter().enumerate() {
                if let Some(tool) = self.get_tool(val) {
                    println!("{}. {}\n", i + 1, get_help(tool)?);
                }
            }
        }
        Ok(())
    }

    pub fn tool_parameters(&self, tool_name: String) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => println!("{}", tool.get_tool_parameters()),
            None => return Err(ToolManager::unrecognized(&tool_name)),
        }
        Ok(())
    }

    pub fn toolbox(&self, tool_name: String) -> Result<(), Error> {
        if !tool_name.is_empty() {
            match self.get_tool(tool_name.as_ref()) {
                Some(tool) => println!("{}", tool.get_toolbox()),
                None => return Err(ToolManager::unrecognized(&tool_name)),
            }
        } else {
            for val in &self.tool_names {
                if let Some(tool) = self.get_tool(val) {
                    println!("{}: {}", val, tool.get_toolbox());
                }
            }
        }
        Ok(())
    }

    pub fn list_tools(&self) {
        let tool_details = self.tool_details(&[]);
        let mut ret = format!("All {} Available Tools:\n", tool_details.len());
        for (name, description) in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", name, description));
        }
        println!("{}", ret);
    }

    pub fn list_tools_with_keywords(&self, keywords: Vec<String>) {
        let tool_details = self.tool_details(&keywords);
        let mut ret = format!("All {} Tools containing keywords:\n", tool_details.len());
        for (name, description) in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", name, description));
        }
        println!("{}", ret);
    }

    /// Names and descriptions of the tools matching any of `keywords`, or of
    /// every tool when there are none.
    fn tool_details(&self, keywords: &[String]) -> Vec<(String, String)> {
        let mut tool_details: Vec<(String, String)> = Vec::new();
        for val in &self.tool_names {
            let tool = match self.get_tool(val) {
                Some(tool) => tool,
                None => continue,
            };
            let toolbox = tool.get_toolbox().to_lowercase();
            let (nm, des) = (tool.get_tool_name(), tool.get_tool_description());
            let matched = keywords.is_empty()
                || keywords.iter().any(|kw| {
                    let kw = kw.to_lowercase();
                    nm.to_lowercase().contains(&kw)
                        || des.to_lowercase().contains(&kw)
                        || toolbox.contains(&kw)
                });
            if matched {
                tool_details.push((nm, des));
            }
        }
        tool_details.sort();
        tool_details
    }
}

pub trait FeatureLineTool {
    fn get_tool_name(&self) -> String;
    fn get_tool_description(&self) -> String;
    fn get_tool_parameters(&self) -> String;
    fn get_example_usage(&self) -> String;
    fn get_toolbox(&self) -> String;
    fn run(&self, args: Vec<String>, configs: &Configs) -> Result<(), Error>;
}

fn get_help<'a>(wt: Box<dyn FeatureLineTool + 'a>) -> Result<String, Error> {
    let tool_name = wt.get_tool_name();
    let description = wt.get_tool_description();
    let parameters = wt.get_tool_parameters();
    let toolbox = wt.get_toolbox();
    let o: serde_json::Value = serde_json::from_str(&parameters)?;
    let mut p = String::new();
    p.push_str("Flag               Description\n");
    p.push_str("-----------------  -----------\n");
    if let Some(a) = o["parameters"].as_array() {
        for d in a {
            let flags: Vec<&str> = d["flags"]
                .as_array()
                .map(|f| f.iter().filter_map(|v| v.as_str()).collect())
                .unwrap_or_default();
            p.push_str(&format!(
                "{:width$} {}\n",
                flags.join(", "),
                d["description"].as_str().unwrap_or(""),
                width = 18
            ));
        }
    }
    let example = wt.get_example_usage();
    let s = if example.len() <= 1 {
        format!(
            "{}

Description:\n{}
Toolbox: {}
Parameters:\n
{}
",
            tool_name, description, toolbox, p
        )
    } else {
        format!(
            "{}
Description:\n{}
Toolbox: {}
Parameters:\n
{}

Example usage:
{}
",
            tool_name, description, toolbox, p, example
        )
    };
    Ok(s)
}

/// Serializes a tool's parameter list the way `--toolparameters` prints it.
fn parameters_to_json(parameters: &[ToolParameter]) -> String {
    let mut s = String::from("{\"parameters\": [");
    for i in 0..parameters.len() {
        s.push_str(&(parameters[i].to_string()));
        if i < parameters.len() - 1 {
            s.push_str(",");
        }
    }
    s.push_str("]}");
    s
}

/// The example command line for a tool, with the running executable's name.
fn example_usage(tool_name: &str, args: &str) -> String {
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let short_exe = match env::current_exe() {
        Ok(exe) => {
            let mut name = exe
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or("featureline_tools".to_string());
            if exe.extension().map_or(false, |e| e == "exe") {
                name += ".exe";
            }
            name
        }
        Err(_) => "featureline_tools".to_string(),
    };
    format!(
        ">>.*{0} -r={1} -v --wd=\"*path*to*data*\" {2}",
        short_exe, tool_name, args
    )
    .replace("*", &sep)
}

fn welcome(tool_name: &str) {
    let welcome_len = format!("* Welcome to {} *", tool_name).len().max(31);
    // 31 = length of the 'Powered by' statement.
    println!("{}", "*".repeat(welcome_len));
    println!(
        "* Welcome to {} {}*",
        tool_name,
        " ".repeat(welcome_len - 15 - tool_name.len())
    );
    println!("* Powered by FeatureLine Tools {}*", " ".repeat(welcome_len - 31));
    println!("{}", "*".repeat(welcome_len));
}

/// Prefixes a bare file name with the working directory.
fn resolve_path(file_name: &str, working_directory: &str) -> String {
    if file_name.is_empty()
        || file_name.contains(path::MAIN_SEPARATOR)
        || file_name.contains('/')
        || working_directory.is_empty()
    {
        return file_name.to_string();
    }
    let sep = path::MAIN_SEPARATOR;
    if working_directory.ends_with(sep) {
        format!("{}{}", working_directory, file_name)
    } else {
        format!("{}{}{}", working_directory, sep, file_name)
    }
}

/// Splits tool arguments into lower-cased, single-dash flags and their
/// values, accepting both `--flag=value` and `--flag value`. Flags without a
/// value, such as `--best_fit`, map to an empty string.
fn parse_args(args: &[String]) -> Result<Vec<(String, String)>, Error> {
    if args.len() == 0 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Tool run with no parameters.",
        ));
    }
    let mut parsed = vec![];
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].replace("\"", "").replace("\'", "");
        let vec = arg.splitn(2, '=').collect::<Vec<&str>>();
        let flag_val = vec[0].to_lowercase().replace("--", "-");
        if !flag_val.starts_with('-') {
            i += 1;
            continue;
        }
        if vec.len() > 1 {
            parsed.push((flag_val, vec[1].to_string()));
        } else if i + 1 < args.len() && !looks_like_flag(&args[i + 1]) {
            parsed.push((flag_val, args[i + 1].replace("\"", "").replace("\'", "")));
            i += 1;
        } else {
            parsed.push((flag_val, String::new()));
        }
        i += 1;
    }
    Ok(parsed)
}

fn looks_like_flag(arg: &str) -> bool {
    arg.starts_with('-') && arg[1..].chars().next().map_or(false, |c| c.is_alphabetic() || c == '-')
}

fn parse_value<T: FromStr>(flag: &str, value: &str) -> Result<T, Error> {
    value.trim().parse::<T>().map_err(|_| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Error parsing {} from '{}'.", flag, value),
        )
    })
}

/// A switch is on when it is given without a value, or with one containing 't'.
fn parse_switch(value: &str) -> bool {
    value.is_empty() || value.to_lowercase().contains('t')
}

fn required(value: &str, name: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("The required parameter '{}' was not specified.", name),
        ));
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug)]
struct ToolParameter {
    name: String,
    flags: Vec<String>,
    description: String,
    parameter_type: ParameterType,
    default_value: Option<String>,
    optional: bool,
}

impl ToolParameter {
    pub fn to_string(&self) -> String {
        let v = match serde_json::to_string(&self) {
            Ok(json_str) => json_str,
            Err(err) => format!("{:?}", err),
        };
        v
    }
}

#[derive(Serialize, Deserialize, Debug)]
enum ParameterType {
    Boolean,
    StringList,
    Integer,
    Float,
    VectorAttributeField(AttributeType, String),
    ExistingFile(ParameterFileType),
    NewFile(ParameterFileType),
    OptionList(Vec<String>),
}

#[derive(Serialize, Deserialize, Debug)]
enum ParameterFileType {
    Vector(VectorGeometryType),
}

#[derive(Serialize, Deserialize, Debug)]
enum VectorGeometryType {
    Line,
}

#[derive(Serialize, Deserialize, Debug)]
enum AttributeType {
    Any,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_tool_ignores_case_and_underscores() {
        let tm = ToolManager::new(&Configs::new()).unwrap();
        assert!(tm.get_tool("FeatureLineGapClosure").is_some());
        assert!(tm.get_tool("feature_line_gap_closure").is_some());
        assert!(tm.get_tool("Slope").is_none());
        for name in &tm.tool_names {
            let tool = tm.get_tool(name).unwrap();
            assert_eq!(&tool.get_tool_name(), name);
        }
    }

    #[test]
    fn test_tool_parameters_are_valid_json() {
        let tm = ToolManager::new(&Configs::new()).unwrap();
        for name in &tm.tool_names {
            let tool = tm.get_tool(name).unwrap();
            let v: serde_json::Value = serde_json::from_str(&tool.get_tool_parameters()).unwrap();
            assert!(v["parameters"].as_array().map_or(false, |a| !a.is_empty()));
            let help = get_help(tool).unwrap();
            assert!(help.starts_with(name.as_str()));
        }
    }

    #[test]
    fn test_parse_args() {
        let args: Vec<String> = vec!["-i=roads.geojson", "--OUTPUT", "out.geojson", "--best_fit", "--dist=-2.5"]
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let parsed = parse_args(&args).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("-i".to_string(), "roads.geojson".to_string()),
                ("-output".to_string(), "out.geojson".to_string()),
                ("-best_fit".to_string(), String::new()),
                ("-dist".to_string(), "-2.5".to_string()),
            ]
        );
        assert!(parse_args(&[]).is_err());
        assert!(parse_value::<f64>("-dist", "abc").is_err());
        assert!(parse_switch("") && parse_switch("true") && !parse_switch("false"));
    }

    #[test]
    fn test_resolve_path() {
        let sep = path::MAIN_SEPARATOR;
        let wd = format!("{}data{}", sep, sep);
        assert_eq!(resolve_path("a.geojson", &wd), format!("{}a.geojson", wd));
        assert_eq!(resolve_path("/tmp/a.geojson", &wd), "/tmp/a.geojson");
        assert_eq!(resolve_path("a.geojson", ""), "a.geojson");
    }
}
