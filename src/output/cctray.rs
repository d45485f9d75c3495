use anyhow::Result;
use serde::Serialize;

use crate::feed::Project;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

#[derive(Serialize)]
struct Projects<'a> {
    #[serde(rename = "Project")]
    projects: Vec<CcProject<'a>>,
}

#[derive(Serialize)]
struct CcProject<'a> {
    #[serde(rename = "@name")]
    name: &'a str,
    #[serde(rename = "@activity")]
    activity: &'static str,
    #[serde(rename = "@lastBuildStatus")]
    last_build_status: &'static str,
    #[serde(rename = "@lastBuildLabel")]
    last_build_label: &'a str,
    #[serde(rename = "@lastBuildTime")]
    last_build_time: &'a str,
    #[serde(rename = "@webUrl")]
    web_url: &'a str,
}

impl<'a> From<&'a Project> for CcProject<'a> {
    fn from(project: &'a Project) -> Self {
        Self {
            name: &project.name,
            activity: project.activity.as_str(),
            last_build_status: project.last_build_status.as_str(),
            last_build_label: &project.last_build_label,
            last_build_time: &project.last_build_time,
            web_url: &project.web_url,
        }
    }
}

/// Renders projects as a CCTray `cc.xml` document, in the order given.
pub fn render_cctray(projects: &[Project]) -> Result<String> {
    let document = Projects {
        projects: projects.iter().map(CcProject::from).collect(),
    };

    let body = quick_xml::se::to_string(&document)?;
    Ok(format!("{XML_DECLARATION}{body}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Activity, BuildStatus};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct ParsedProjects {
        #[serde(rename = "Project", default)]
        projects: Vec<ParsedProject>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct ParsedProject {
        #[serde(rename = "@name")]
        name: String,
        #[serde(rename = "@activity")]
        activity: String,
        #[serde(rename = "@lastBuildStatus")]
        last_build_status: String,
        #[serde(rename = "@lastBuildLabel")]
        last_build_label: String,
        #[serde(rename = "@lastBuildTime")]
        last_build_time: String,
        #[serde(rename = "@webUrl")]
        web_url: String,
    }

    fn create_project(name: &str) -> Project {
        Project {
            name: name.to_string(),
            activity: Activity::Sleeping,
            last_build_status: BuildStatus::Success,
            last_build_label: "pipeline1".to_string(),
            last_build_time: "2017-08-11T16:58:49.000Z".to_string(),
            web_url: "https://ci.example.com/teams/main/pipelines/pipeline1/jobs/job1/builds/2"
                .to_string(),
        }
    }

    fn parse(xml: &str) -> ParsedProjects {
        quick_xml::de::from_str(xml).unwrap()
    }

    #[test]
    fn test_renders_projects_in_order() {
        let mut building = create_project("pipeline1#job2");
        building.activity = Activity::Building;
        building.last_build_status = BuildStatus::Failure;

        let xml = render_cctray(&[create_project("pipeline1#job1"), building]).unwrap();

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("<Projects>"));
        let parsed = parse(&xml);
        let names: Vec<_> = parsed.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["pipeline1#job1", "pipeline1#job2"]);
        assert_eq!(
            parsed.projects[0],
            ParsedProject {
                name: "pipeline1#job1".to_string(),
                activity: "Sleeping".to_string(),
                last_build_status: "Success".to_string(),
                last_build_label: "pipeline1".to_string(),
                last_build_time: "2017-08-11T16:58:49.000Z".to_string(),
                web_url:
                    "https://ci.example.com/teams/main/pipelines/pipeline1/jobs/job1/builds/2"
                        .to_string(),
            }
        );
        assert_eq!(parsed.projects[1].activity, "Building");
        assert_eq!(parsed.projects[1].last_build_status, "Failure");
    }

    #[test]
    fn test_empty_feed_has_no_projects() {
        let xml = render_cctray(&[]).unwrap();

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("Projects"));
        assert!(!xml.contains("<Project "));
        assert!(parse(&xml).projects.is_empty());
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let mut project = create_project("a&b#<job>");
        project.last_build_label = "\"quoted\"".to_string();

        let xml = render_cctray(&[project]).unwrap();

        assert!(xml.contains("a&amp;b#&lt;job"));
        assert!(!xml.contains("a&b"));
        assert!(xml.contains("&quot;quoted&quot;"));
        let parsed = parse(&xml);
        assert_eq!(parsed.projects[0].name, "a&b#<job>");
        assert_eq!(parsed.projects[0].last_build_label, "\"quoted\"");
    }
}
