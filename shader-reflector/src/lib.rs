use std::error::Error;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

mod error;
pub use error::*;

pub mod ir;
pub use ir::{ReflectionSource, ShaderModuleIr};

pub mod classify;

pub mod naming;
pub use naming::NameAllocator;

pub mod layout;

pub mod vertex_input;

pub mod resources;

pub mod document;
pub use document::Document;

pub mod reflector;
pub use reflector::{generate_document, Reflector, ReflectorOptions};

pub mod codegen;
pub use codegen::{RustBindingsRenderer, TemplateRenderer};

#[cfg(test)]
mod testing;

#[derive(StructOpt, Debug)]
pub struct ShaderReflectorArgs {
    //
    // For one file at a time
    //
    #[structopt(name = "ir-file", long, parse(from_os_str))]
    pub ir_file: Option<PathBuf>,
    #[structopt(name = "json-file", long, parse(from_os_str))]
    pub json_file: Option<PathBuf>,
    #[structopt(name = "rs-file", long, parse(from_os_str))]
    pub rs_file: Option<PathBuf>,
    #[structopt(name = "rs-test-file", long, parse(from_os_str))]
    pub rs_test_file: Option<PathBuf>,
    #[structopt(name = "shader-name", long)]
    pub shader_name: Option<String>,
    #[structopt(name = "header-file-name", long)]
    pub header_file_name: Option<String>,

    //
    // For batch processing a folder
    //
    #[structopt(name = "ir-path", long, parse(from_os_str))]
    pub ir_path: Option<PathBuf>,
    #[structopt(name = "json-path", long, parse(from_os_str))]
    pub json_path: Option<PathBuf>,
    #[structopt(name = "rs-path", long, parse(from_os_str))]
    pub rs_path: Option<PathBuf>,

    #[structopt(name = "trace", long)]
    pub trace: bool,
}

/// Where the artifacts of one reflection pass are written. `None` skips that artifact.
#[derive(Debug, Default)]
struct OutputFiles {
    json_file: Option<PathBuf>,
    rs_file: Option<PathBuf>,
    rs_test_file: Option<PathBuf>,
}

pub fn run(args: &ShaderReflectorArgs) -> Result<(), Box<dyn Error>> {
    log::trace!("Shader reflector args: {:#?}", args);

    if let Some(ir_file) = &args.ir_file {
        //
        // Handle a single file given via --ir-file. In this mode, the output files are explicit
        //
        log::info!("Reflecting file {:?}", ir_file);

        let shader_name = args
            .shader_name
            .clone()
            .unwrap_or_else(|| default_shader_name(ir_file));
        let header_file_name = args
            .header_file_name
            .clone()
            .unwrap_or_else(|| format!("{}.rs", shader_name));

        let options = ReflectorOptions {
            shader_name,
            header_file_name,
        };

        let output_files = OutputFiles {
            json_file: args.json_file.clone(),
            rs_file: args.rs_file.clone(),
            rs_test_file: args.rs_test_file.clone(),
        };

        let names = NameAllocator::new();
        process_ir_file(ir_file, &options, &output_files, &names)
            .map_err(|x| format!("{}: {}", ir_file.to_string_lossy(), x.to_string()))?;

        Ok(())
    } else if let Some(ir_path) = &args.ir_path {
        log::trace!("ir path {:?}", ir_path);
        process_directory(ir_path, args)
    } else {
        Ok(())
    }
}

/// IR files are named `<shader_name>.ir.json` so that they never match the `.json` documents the
/// reflector writes
pub const IR_FILE_EXTENSION: &str = ".ir.json";

fn default_shader_name(ir_file: &Path) -> String {
    let file_name = ir_file
        .file_name()
        .map(|x| x.to_string_lossy().to_string())
        .unwrap_or_default();

    match file_name.strip_suffix(IR_FILE_EXTENSION) {
        Some(shader_name) => shader_name.to_string(),
        None => ir_file
            .file_stem()
            .map(|x| x.to_string_lossy().to_string())
            .unwrap_or_default(),
    }
}

fn rs_module_name(shader_name: &str) -> String {
    shader_name.to_lowercase().replace(".", "_")
}

//
// Handle every *.ir.json file under --ir-path. Infer output files based on other args given in the
// form of output directories. All passes share one name allocator.
//
fn process_directory(
    ir_path: &PathBuf,
    args: &ShaderReflectorArgs,
) -> Result<(), Box<dyn Error>> {
    log::trace!("IR Root Dir: {:?}", ir_path);

    let ir_path_str = ir_path
        .to_str()
        .ok_or_else(|| format!("Path {:?} is not valid unicode", ir_path))?;
    let ir_pattern = format!("*{}", IR_FILE_EXTENSION);
    let glob_walker = globwalk::GlobWalkerBuilder::from_patterns(ir_path_str, &[ir_pattern])
        .file_type(globwalk::FileType::FILE)
        .build()?;

    // Output directories may be nested inside the input directory
    let output_paths: Vec<&PathBuf> = args.json_path.iter().chain(args.rs_path.iter()).collect();

    let mut jobs = Vec::default();
    for glob in glob_walker {
        //
        // Determine the files we will write out
        //
        let ir_file = glob?.into_path();
        if output_paths.iter().any(|x| ir_file.starts_with(x)) {
            log::trace!("Skipping generated file {:?}", ir_file);
            continue;
        }

        let empty_path = PathBuf::new();
        let outfile_prefix = ir_file
            .strip_prefix(ir_path)?
            .parent()
            .unwrap_or(&empty_path)
            .to_path_buf();

        let shader_name = default_shader_name(&ir_file);
        let module_name = rs_module_name(&shader_name);
        let header_file_name = format!("{}.rs", module_name);

        let output_files = OutputFiles {
            json_file: args
                .json_path
                .as_ref()
                .map(|x| x.join(&outfile_prefix).join(format!("{}.json", shader_name))),
            rs_file: args
                .rs_path
                .as_ref()
                .map(|x| x.join(&outfile_prefix).join(&header_file_name)),
            rs_test_file: args
                .rs_path
                .as_ref()
                .map(|x| x.join(&outfile_prefix).join(format!("{}_tests.rs", module_name))),
        };

        let options = ReflectorOptions {
            shader_name,
            header_file_name,
        };

        jobs.push((ir_file, options, output_files));
    }

    let worker_count = std::thread::available_parallelism()
        .map(|x| x.get())
        .unwrap_or(1)
        .min(jobs.len())
        .max(1);
    let chunk_size = (jobs.len() + worker_count - 1) / worker_count;
    log::trace!(
        "Reflecting {} files on {} threads",
        jobs.len(),
        worker_count
    );

    let names = NameAllocator::new();
    let results: Vec<Result<(), String>> = std::thread::scope(|scope| {
        let workers: Vec<_> = jobs
            .chunks(chunk_size.max(1))
            .map(|chunk| {
                let names = &names;
                scope.spawn(move || -> Result<(), String> {
                    for (ir_file, options, output_files) in chunk {
                        log::info!("Reflecting file {:?}", ir_file);
                        process_ir_file(ir_file, options, output_files, names).map_err(|x| {
                            format!("{}: {}", ir_file.to_string_lossy(), x.to_string())
                        })?;
                    }

                    Ok(())
                })
            })
            .collect();

        workers
            .into_iter()
            .map(|x| {
                x.join()
                    .unwrap_or_else(|_| Err("Reflection thread panicked".to_string()))
            })
            .collect()
    });

    for result in results {
        result?;
    }

    Ok(())
}

fn process_ir_file(
    ir_file: &Path,
    options: &ReflectorOptions,
    output_files: &OutputFiles,
    names: &NameAllocator,
) -> ReflectorResult<()> {
    let ir = ShaderModuleIr::load(ir_file)?;
    let reflector = Reflector::new(options, &ir, names, &RustBindingsRenderer)?;

    log::trace!(
        "{}: {} struct definitions",
        options.shader_name,
        reflector.document().struct_definitions.len()
    );

    if let Some(json_file) = &output_files.json_file {
        write_output_file(json_file, reflector.reflection_json())?;
    }

    if let Some(rs_file) = &output_files.rs_file {
        write_output_file(rs_file, reflector.reflection_header())?;
    }

    if let Some(rs_test_file) = &output_files.rs_test_file {
        write_output_file(rs_test_file, reflector.reflection_source())?;
    }

    Ok(())
}

fn write_output_file<C: AsRef<[u8]>>(
    path: &Path,
    contents: C,
) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}
