use tera::{Context, Tera};

use crate::pdf::PageSetup;
use crate::report::layout::WageRegister;

const TEMPLATE_NAME: &str = "wage_register.html";

/// Compiled report templates, built once at startup.
pub struct HtmlRenderer {
    tera: Tera,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(
            TEMPLATE_NAME,
            include_str!("../../templates/wage_register.html"),
        )?;
        Ok(Self { tera })
    }

    pub fn render(&self, register: &WageRegister, page: &PageSetup) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("register", register);
        context.insert("page_css", &page.css());
        self.tera.render(TEMPLATE_NAME, &context)
    }
}
