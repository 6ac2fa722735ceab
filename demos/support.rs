use bdd_support::bdd::Bdd;
use bdd_support::reference::Ref;
use bdd_support::support::SupportOp;
use bdd_support::types::Var;
use clap::{Parser, ValueEnum};

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Function {
    /// x1 ∧ x2 ∧ ... ∧ xn
    And,
    /// x1 ⊕ x2 ⊕ ... ⊕ xn
    Xor,
    /// ¬x1 ∧ (x2 ∨ ... ∨ xn)
    Guarded,
    /// Majority of x1..xn, with every second variable unused
    Sparse,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Support and smallest containing cube of a sample function")]
struct Cli {
    /// Function to analyse
    #[arg(value_enum, default_value_t = Function::Guarded)]
    function: Function,

    /// Number of variables
    #[arg(short, long, default_value_t = 4)]
    num_vars: u32,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn build(bdd: &Bdd, function: Function, n: u32) -> Ref {
    let x: Vec<Ref> = (1..=n).map(|i| bdd.mk_var(Var::new(i))).collect();
    match function {
        Function::And => bdd.apply_and_many(x.iter().copied()),
        Function::Xor => x[1..].iter().fold(x[0], |acc, &xi| bdd.apply_xor(acc, xi)),
        Function::Guarded => {
            let any = x[1..].iter().fold(bdd.zero(), |acc, &xi| bdd.apply_or(acc, xi));
            bdd.apply_and(-x[0], any)
        }
        Function::Sparse => {
            let used: Vec<Ref> = x.iter().copied().step_by(2).collect();
            let mut maj = bdd.zero();
            for i in 0..used.len() {
                for j in i + 1..used.len() {
                    maj = bdd.apply_or(maj, bdd.apply_and(used[i], used[j]));
                }
            }
            maj
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    if args.num_vars < 2 {
        color_eyre::eyre::bail!("need at least 2 variables, got {}", args.num_vars);
    }

    let bdd = Bdd::default();
    let f = build(&bdd, args.function, args.num_vars);
    println!("f = {}", bdd.to_bracket_string(f));
    println!("size(f) = {}", bdd.size(f));

    let mut op = SupportOp::new(&bdd);
    let n = op.compute_support(&[f]);
    let vars = op.vars();
    println!(
        "support ({} of {}): [{}]",
        n,
        bdd.num_vars(),
        vars.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
    );
    println!("support cube = {}", bdd.to_bracket_string(op.to_bdd()));

    if bdd.is_zero(f) {
        println!("scc undefined for the constant false");
        return Ok(());
    }
    let cube = op.compute_scc(f);
    let classes = op
        .support()
        .iter()
        .map(|&level| format!("{}:{}", bdd.var_at(level), op.branch(level)))
        .collect::<Vec<_>>();
    println!("branches = [{}]", classes.join(", "));
    println!("scc = {}", bdd.to_bracket_string(cube));
    println!(
        "models: f = {}, scc = {}",
        bdd.sat_count(f, bdd.num_vars()),
        bdd.sat_count(cube, bdd.num_vars())
    );

    Ok(())
}
