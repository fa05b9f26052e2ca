//! Mapping from render options to the CDP print call.

use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;

use docpress_shared::RenderOptions;

/// Build the `Page.printToPDF` parameters for a render. CDP measures paper
/// size and margins in inches.
pub fn print_params(options: &RenderOptions) -> PrintToPdfParams {
    let (paper_width, paper_height) = options.format.paper_size();
    PrintToPdfParams {
        print_background: Some(options.print_background),
        paper_width: Some(paper_width),
        paper_height: Some(paper_height),
        margin_top: Some(options.margin.top.to_inches()),
        margin_right: Some(options.margin.right.to_inches()),
        margin_bottom: Some(options.margin.bottom.to_inches()),
        margin_left: Some(options.margin.left.to_inches()),
        ..Default::default()
    }
}
