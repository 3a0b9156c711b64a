use askama::Template;

use crate::command::ToolOutcome;
use crate::error::{LibrarianError, Result};
use crate::filter::{FilterDescriptor, FilterMode, Submission, EXACT_TEXT_MAX_LEN};
use crate::schema::{FieldRef, FieldSchema};

pub const PAGE_TITLE: &str = "Librarian - Nox Archive Browsing System";

/// Option the mode dropdown shows as selected.
pub fn render_option(descriptor: &FilterDescriptor) -> FilterMode {
    descriptor.selected_mode()
}

/// Whether the exact-text box is shown. Hidden boxes are still submitted.
pub fn render_visibility(descriptor: &FilterDescriptor) -> bool {
    descriptor.exact_visible()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub label: String,
    pub select_name: String,
    /// False for fields whose mode is fixed; their dropdown is hidden.
    pub editable: bool,
    pub options: Vec<OptionView>,
    pub exact_name: String,
    pub exact_text: String,
    pub exact_visible: bool,
}

impl FieldView {
    fn new(field: FieldRef<'_>, descriptor: &FilterDescriptor) -> Self {
        let options = if descriptor.is_forced_exact() {
            vec![option(FilterMode::ExactText, true)]
        } else {
            let selected = render_option(descriptor);
            FilterMode::ALL
                .into_iter()
                .map(|mode| option(mode, mode == selected))
                .collect()
        };
        Self {
            label: field.name.to_string(),
            select_name: field.id(),
            editable: !descriptor.is_forced_exact(),
            options,
            exact_name: field.exact_id(),
            exact_text: descriptor.display_text().to_string(),
            exact_visible: render_visibility(descriptor),
        }
    }

    /// Value a browser posts for this dropdown.
    pub fn submitted_mode(&self) -> Option<&'static str> {
        self.options
            .iter()
            .find(|option| option.selected)
            .or_else(|| self.options.first())
            .map(|option| option.value)
    }
}

fn option(mode: FilterMode, selected: bool) -> OptionView {
    OptionView {
        value: mode.wire_value(),
        label: mode.label(),
        selected,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryView {
    pub name: String,
    pub fields: Vec<FieldView>,
}

/// Control state for the whole form, derived only from the decoded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub categories: Vec<CategoryView>,
}

impl FormView {
    pub fn build(schema: &FieldSchema, descriptors: &[FilterDescriptor]) -> Result<Self> {
        let expected = schema.field_count();
        if descriptors.len() != expected {
            return Err(LibrarianError::ArityMismatch {
                expected,
                actual: descriptors.len(),
            });
        }
        let mut pending = descriptors.iter();
        let mut categories = Vec::with_capacity(schema.categories().len());
        for category in schema.categories() {
            let mut fields = Vec::with_capacity(category.fields().len());
            for (name, descriptor) in category.fields().iter().zip(pending.by_ref()) {
                let field = FieldRef {
                    category: category.name(),
                    name,
                };
                fields.push(FieldView::new(field, descriptor));
            }
            categories.push(CategoryView {
                name: category.name().to_string(),
                fields,
            });
        }
        Ok(Self { categories })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldView> {
        self.categories.iter().flat_map(|c| c.fields.iter())
    }

    pub fn field(&self, select_name: &str) -> Option<&FieldView> {
        self.fields().find(|f| f.select_name == select_name)
    }

    /// The values this form would post back if submitted unchanged.
    pub fn resubmission(&self) -> Submission {
        let mut submission = Submission::new();
        for field in self.fields() {
            if let Some(mode) = field.submitted_mode() {
                submission.insert(field.select_name.clone(), mode);
            }
            submission.insert(field.exact_name.clone(), field.exact_text.clone());
        }
        submission
    }
}

/// Tool echo shown to the operator as an HTML comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    lines: Vec<String>,
}

impl Diagnostics {
    pub fn from_outcome(outcome: &ToolOutcome) -> Self {
        let mut lines = Vec::with_capacity(outcome.output_lines.len() + 2);
        lines.push(outcome.command_line.clone());
        lines.extend(outcome.output_lines.iter().cloned());
        lines.push(match outcome.status_code {
            Some(code) => code.to_string(),
            None => "terminated by signal".to_string(),
        });
        Self { lines }
    }

    pub fn from_error(command_line: &str, err: &LibrarianError) -> Self {
        Self {
            lines: vec![command_line.to_string(), err.to_string()],
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[derive(Template)]
#[template(
    ext = "html",
    source = r#"<html>

<head>
<title>{{ title }}</title>

<style type="text/css">
table, select, input
{
    font-family: monospace;
    font-size: 8pt;
}

b
{
    font-size: 10pt;
}
</style>

<script type="text/javascript">
function check_exact(item, exact)
{
    exact = document.getElementsByName(exact)[0];
    if (item.options[item.selectedIndex].value == "Exact")
    {
        exact.style.display = "block";
    }
    else
    {
        exact.style.display = "none";
    }
}

function init()
{
{%- for category in form.categories %}
{%- for field in category.fields %}
    check_exact(document.graph_selection.{{ field.select_name }}, "{{ field.exact_name }}");
{%- endfor %}
{%- endfor %}
}
</script>
</head>
{% if !diagnostics.is_empty() %}
<!-- lookup diagnostics
{%- for line in diagnostics %}
{{ line }}
{%- endfor %}
-->
{% endif %}
<body onload="init()">

<table><tr>
  <td>
    <form name="graph_selection" method="post" action=".">
    <table width="100%">
{%- for category in form.categories %}
    <tr><td colspan="2"><b>{{ category.name }}</b></td></tr>
{%- for field in category.fields %}
      <tr><td>{{ field.label }}</td><td>
       <select name="{{ field.select_name }}" align="right"{% if !field.editable %} style="display:none"{% endif %} onchange='check_exact(this, "{{ field.exact_name }}")'>
{%- for option in field.options %}
       <option value="{{ option.value }}"{% if option.selected %} selected{% endif %}>{{ option.label }}</option>
{%- endfor %}
       </select></td></tr><tr><td colspan="2">
       <input name="{{ field.exact_name }}" type="text" value="{{ field.exact_text }}" size="{{ input_size }}" maxlength="{{ input_size }}" style="display:{% if field.exact_visible %}block{% else %}none{% endif %}"></td></tr>
{%- endfor %}
{%- endfor %}
    <tr><td colspan="2"><br></td></tr>
    <tr><td colspan="2" align="center"><input name="update" type="submit" value="Graph Result"></td></tr>
    </table>
    </form>
  </td>

  <td>
    <img src="{{ image_src }}" onclick="this.src='{{ image_name }}?' + Math.random()">
  </td>
</tr></table>

</body>

</html>
"#
)]
pub struct LibrarianPage<'a> {
    title: &'a str,
    form: &'a FormView,
    image_name: &'a str,
    image_src: String,
    input_size: usize,
    diagnostics: &'a [String],
}

impl<'a> LibrarianPage<'a> {
    pub fn new(form: &'a FormView, image_name: &'a str) -> Self {
        Self {
            title: PAGE_TITLE,
            form,
            image_name,
            image_src: image_name.to_string(),
            input_size: EXACT_TEXT_MAX_LEN,
            diagnostics: &[],
        }
    }

    /// Appends a cache-busting query so the browser refetches the image.
    pub fn cache_bust(mut self, token: u64) -> Self {
        self.image_src = format!("{}?v={token}", self.image_name);
        self
    }

    pub fn diagnostics(mut self, diagnostics: &'a Diagnostics) -> Self {
        self.diagnostics = diagnostics.lines();
        self
    }

    pub fn to_html(&self) -> Result<String> {
        Ok(self.render()?)
    }
}
