use std::{env, path::PathBuf};

fn main() {
  println!("cargo:rerun-if-changed=src/ffi.rs");
  println!("cargo:rerun-if-changed=src/arena/usage.rs");

  let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
  let include = PathBuf::from(&crate_dir).join("include");
  if let Err(err) = std::fs::create_dir_all(&include) {
    println!("cargo:warning=failed to create {}: {err}", include.display());
    return;
  }

  match cbindgen::Builder::new()
    .with_crate(&crate_dir)
    .with_language(cbindgen::Language::C)
    .with_include_guard("SEGARENA_H")
    .generate()
  {
    Ok(bindings) => {
      bindings.write_to_file(include.join("segarena.h"));
    }
    Err(err) => println!("cargo:warning=failed to generate C header: {err}"),
  }
}
