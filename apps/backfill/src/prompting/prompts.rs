// Fixed prompt text used by the builder and the enrichment step.

pub const INSTRUCTIONS_HEADING: &str = "Instructions:";
pub const DESCRIPTIONS_HEADING: &str = "Descriptions:";
pub const INPUT_FORMAT_HEADING: &str = "Input Format:";
pub const OUTPUT_FORMAT_HEADING: &str = "Output Format:";
pub const EXAMPLES_HEADING: &str = "Here are some examples:";
pub const TARGET_HEADING: &str = "Now predict for this product:";

/// Opening line of the product-mode prompt.
pub const PRODUCT_REQUEST: &str = "Please predict the dimensions (length, width, height in cm) \
and weight (in kg) for the following product:";

pub const PRODUCT_CLOSING: &str = "Please provide your best estimate based on similar products.";

pub const REFERENCE_HEADING: &str = "Here are some similar products for reference:";

pub const REFERENCE_CLOSING: &str = "Based on these similar products and the product description, \
predict the dimensions and weight for the product.";

// Defaults substituted for missing record fields.
pub const DEFAULT_NAME: &str = "Unknown";
pub const DEFAULT_DESCRIPTION: &str = "No description";
pub const DEFAULT_CATEGORY: &str = "Uncategorized";
