/// Path of the tabular sibling of a JSON file: `tsv` for tabs, `csv` otherwise.
pub fn tabular_path(json_path: &str, delimiter: char) -> String {
    let extension = if delimiter == '\t' { "tsv" } else { "csv" };
    match json_path.strip_suffix("json") {
        Some(stem) => format!("{}{}", stem, extension),
        None => format!("{}.{}", json_path, extension),
    }
}

/// Where the transformed batch goes: the input path minus its first `raw/` segment.
pub fn derived_output_path(input_path: &str) -> String {
    input_path.replacen("raw/", "", 1)
}
