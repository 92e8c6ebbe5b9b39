fn main() -> anyhow::Result<()> {
    flow_materials::run(flow_materials::Settings::from_env())
}
