// Fixed instructions sent to the vision model.

pub enum Prompt {
    DescribeImage,
}

impl Prompt {
    pub fn text(&self) -> &'static str {
        match self {
            Prompt::DescribeImage => include_str!("describe_image.md"),
        }
    }
}
