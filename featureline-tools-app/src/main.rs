/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 02/09/2026
Last Modified: 06/10/2026
License: MIT
*/

/*!
FeatureLine Tools is a command-line program for analysing networks of vector
lines: closing gaps between line endpoints, assembling parallel lines into
corridors, measuring relative angles between line sets and reshaping lines.
The following commands are recognized:

| Command           | Description                                                                                 |
| ----------------- | ------------------------------------------------------------------------------------------- |
| --cd, --wd        | Changes the working directory; used in conjunction with --run flag.                         |
| -h, --help        | Prints help information.                                                                    |
| -l, --license     | Prints the featureline-tools license.                                                       |
| --listtools       | Lists all available tools, with tool descriptions. Keywords may also be used.               |
| --max_procs       | Sets the maximum number of processors used. -1 = all available processors.                  |
| --overwrite       | Allows tools to replace existing output files.                                              |
| -r, --run         | Runs a tool; used in conjunction with --cd flag; -r="FeatureLineGapClosure".                |
| --toolbox         | Prints the toolbox associated with a tool; --toolbox=FeatureLineSplit.                      |
| --toolhelp        | Prints the help associated with a tool; --toolhelp="FeatureLineGapClosure".                 |
| --toolparameters  | Prints the parameters (in json form) for a specific tool.                                   |
| -v                | Verbose mode. Without this flag, tool outputs will not be printed.                          |
| --version         | Prints the version information.                                                             |

*/

pub mod tools;

use crate::tools::ToolManager;
use featureline_common::configs::{get_configs, save_configs};
use std::env;
use std::io::{Error, ErrorKind};
use std::path;

#[macro_use]
extern crate serde_derive;

/// From the command line prompt, *FeatureLine Tools* can be called to run a
/// tool as follows:
///
/// ```text
/// >>./featureline_tools --wd='/data/roads/' --run=FeatureLineGapClosure -i=roads.geojson -o=gaps.geojson --radius=25.0 -v
/// ```
fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Removes `names` from the front of `arg`, along with any quotes and a
/// leading '='.
fn flag_value(arg: &str, names: &[&str]) -> String {
    let mut v = arg.to_string();
    for name in names {
        v = v.replace(name, "");
    }
    let v = v.replace("\"", "").replace("\'", "");
    match v.strip_prefix("=") {
        Some(s) => s.to_string(),
        None => v,
    }
}

fn run() -> Result<(), Error> {
    let sep: &str = &path::MAIN_SEPARATOR.to_string();
    let mut tool_name = String::new();
    let mut run_tool = false;
    let mut tool_help = false;
    let mut tool_parameters = false;
    let mut toolbox = false;
    let mut list_tools = false;
    let mut keywords: Vec<String> = vec![];
    let mut tool_args_vec: Vec<String> = vec![];
    let mut finding_working_dir = false;
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        version();
        help();
        let tm = ToolManager::new(&get_configs()?)?;
        tm.list_tools();

        return Ok(());
    }

    let mut configs = get_configs()?;
    let mut configs_modified = false;

    for arg in args {
        let flag_val = arg.to_lowercase().replace("--", "-");
        if flag_val == "-h" || flag_val == "-help" {
            help();
            return Ok(());
        } else if flag_val.starts_with("-cd")
            || flag_val.starts_with("-wd")
            || flag_val.starts_with("-working_directory")
        {
            let mut v = flag_value(
                &arg,
                &["--working_directory", "-working_directory", "--cd", "--wd", "-cd", "-wd"],
            );
            if v.trim().is_empty() {
                finding_working_dir = true;
                continue;
            }
            if !v.ends_with(sep) {
                v.push_str(sep);
            }
            if configs.working_directory != v {
                configs.working_directory = v;
                configs_modified = true;
            }
        } else if flag_val.starts_with("-run") || flag_val == "-r" || flag_val.starts_with("-r=") {
            tool_name = flag_value(&arg, &["--run", "-run", "-r"]);
            run_tool = true;
        } else if flag_val.starts_with("-toolhelp") {
            tool_name = flag_value(&arg, &["--toolhelp", "-toolhelp"]);
            tool_help = true;
        } else if flag_val.starts_with("-toolparameters") {
            tool_name = flag_value(&arg, &["--toolparameters", "-toolparameters"]);
            tool_parameters = true;
        } else if flag_val.starts_with("-toolbox") {
            tool_name = flag_value(&arg, &["--toolbox", "-toolbox"]);
            toolbox = true;
        } else if flag_val.starts_with("-listtools") || flag_val.starts_with("-list_tools") {
            list_tools = true;
        } else if flag_val.starts_with("-license")
            || flag_val.starts_with("-licence")
            || flag_val == "-l"
        {
            license();
            return Ok(());
        } else if flag_val.starts_with("-overwrite") {
            let v = flag_value(&arg, &["--overwrite", "-overwrite"]);
            let overwrite = v.is_empty() || v.to_lowercase().contains("t");
            if configs.overwrite_output != overwrite {
                configs.overwrite_output = overwrite;
                configs_modified = true;
            }
        } else if flag_val == "-v" || flag_val.starts_with("-v=") || flag_val.starts_with("-verbose") {
            let v = flag_value(&arg, &["--verbose", "-verbose", "-v"]);
            let verbose = v.is_empty() || v.to_lowercase().contains("t");
            if configs.verbose_mode != verbose {
                configs.verbose_mode = verbose;
                configs_modified = true;
            }
        } else if flag_val.starts_with("-max_procs") {
            let v = flag_value(&arg, &["--max_procs", "-max_procs"]);
            let val = v.trim().parse::<isize>().map_err(|_| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("Error parsing --max_procs value '{}'.", v),
                )
            })?;
            if val != configs.max_procs {
                configs.max_procs = val;
                configs_modified = true;
            }
        } else if flag_val.starts_with("-version") {
            version();
            return Ok(());
        } else if arg.starts_with("-") {
            // it's an arg to be fed to the tool
            tool_args_vec.push(arg.trim().to_string());
        } else {
            if finding_working_dir {
                let mut v = arg.trim().replace("\"", "").replace("\'", "");
                if !v.ends_with(sep) {
                    v.push_str(sep);
                }
                configs.working_directory = v;
                configs_modified = true;
                finding_working_dir = false;
            } else if !tool_args_vec.is_empty() {
                tool_args_vec.push(arg.trim().to_string());
            } else {
                // add it to the keywords list
                keywords.push(arg.trim().replace("\"", "").replace("\'", ""));
            }
        }
    }

    if configs_modified {
        save_configs(&configs)?;
    }

    let tm = ToolManager::new(&configs)?;
    if tool_name.is_empty() && !keywords.is_empty() {
        tool_name = keywords[0].clone();
    }
    if run_tool {
        return tm.run_tool(tool_name, tool_args_vec);
    } else if tool_help {
        return tm.tool_help(tool_name);
    } else if tool_parameters {
        return tm.tool_parameters(tool_name);
    } else if toolbox {
        return tm.toolbox(tool_name);
    } else if list_tools {
        if keywords.is_empty() {
            tm.list_tools();
        } else {
            tm.list_tools_with_keywords(keywords);
        }
    }

    Ok(())
}

fn help() {
    let mut ext = "";
    if cfg!(target_os = "windows") {
        ext = ".exe";
    }

    let exe_name = &format!("featureline_tools{}", ext);
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let s = "FeatureLine Tools Help

The following commands are recognized:
--cd, --wd          Changes the working directory; used in conjunction with --run flag.
-h, --help          Prints help information.
-l, --license       Prints the featureline-tools license.
--listtools         Lists all available tools. Keywords may also be used, --listtools corridor.
--max_procs         Sets the maximum number of processors used. -1 = all available processors. e.g. --max_procs=2
--overwrite         Allows tools to replace existing output files. e.g. --overwrite=false
-r, --run           Runs a tool; used in conjunction with --wd flag; -r=\"FeatureLineGapClosure\".
--toolbox           Prints the toolbox associated with a tool; --toolbox=FeatureLineSplit.
--toolhelp          Prints the help associated with a tool; --toolhelp=\"FeatureLineGapClosure\".
--toolparameters    Prints the parameters (in json form) for a specific tool; --toolparameters=\"FeatureLinePull\".
-v                  Verbose mode. Without this flag, tool outputs will not be printed.
--version           Prints the version information.

Example Usage:
>> .*EXE_NAME -r=FeatureLineGapClosure --cd=\"*path*to*data*\" -i=roads.geojson -o=gaps.geojson --radius=25.0
"
    .replace("*", &sep)
    .replace("EXE_NAME", exe_name);
    println!("{}", s);
}

fn license() {
    let license_text = "FeatureLine Tools License
Copyright 2026 FeatureLine Tools contributors

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the \"Software\"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense,
and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so,
subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or substantial
portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES
OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.";
    println!("{}", license_text);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!(
        "FeatureLine Tools v{} (c) 2026 FeatureLine Tools contributors

FeatureLine Tools analyses networks of vector lines: gap closure between
line endpoints, corridor assembly, relative angles and line reshaping.",
        VERSION.unwrap_or("unknown")
    );
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_flag_value() {
        assert_eq!(flag_value("--run=\"FeatureLinePull\"", &["--run", "-run", "-r"]), "FeatureLinePull");
        assert_eq!(flag_value("-r", &["--run", "-run", "-r"]), "");
        assert_eq!(flag_value("--max_procs=4", &["--max_procs", "-max_procs"]), "4");
    }
}
